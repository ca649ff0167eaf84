use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;
use std::time::Duration;

use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::Window;

use super::WebDemo;
use crate::schedule::{Scheduler, TaskId};

enum Handle {
    Frame(i32),
    Timeout(i32),
}

struct Armed {
    handle: Handle,
    callback: Closure<dyn FnMut()>,
}

/// [`Scheduler`] on `requestAnimationFrame` and `setTimeout`. Each callback
/// re-enters [`crate::GisDemo::on_task`] through a weak reference, so a
/// dropped demo turns late callbacks into no-ops.
pub struct BrowserScheduler {
    window: Window,
    demo: Weak<RefCell<WebDemo>>,
    next_id: u64,
    armed: HashMap<TaskId, Armed>,
    /// Callbacks that already fired. One cannot be dropped while it runs, so
    /// it waits here until the next one fires.
    retired: Vec<Closure<dyn FnMut()>>,
}

impl BrowserScheduler {
    pub fn new(window: Window, demo: Weak<RefCell<WebDemo>>) -> Self {
        Self { window, demo, next_id: 0, armed: HashMap::new(), retired: Vec::new() }
    }

    fn callback(&mut self) -> (TaskId, Closure<dyn FnMut()>) {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let demo = self.demo.clone();
        let callback = Closure::wrap(Box::new(move || {
            let Some(demo) = demo.upgrade() else {
                return;
            };
            let Ok(mut demo) = demo.try_borrow_mut() else {
                log::warn!("task {id:?} fired while the demo was busy");
                return;
            };
            demo.scheduler_mut().retire(id);
            demo.on_task(id);
        }) as Box<dyn FnMut()>);
        (id, callback)
    }

    fn retire(&mut self, id: TaskId) {
        self.retired.clear();
        if let Some(armed) = self.armed.remove(&id) {
            self.retired.push(armed.callback);
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn request_frame(&mut self) -> TaskId {
        let (id, callback) = self.callback();
        match self.window.request_animation_frame(callback.as_ref().unchecked_ref()) {
            Ok(handle) => {
                self.armed.insert(id, Armed { handle: Handle::Frame(handle), callback });
            }
            Err(e) => log::error!("requestAnimationFrame failed: {e:?}"),
        }
        id
    }

    fn set_timeout(&mut self, delay: Duration) -> TaskId {
        let (id, callback) = self.callback();
        let ms = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match self.window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.as_ref().unchecked_ref(), ms) {
            Ok(handle) => {
                self.armed.insert(id, Armed { handle: Handle::Timeout(handle), callback });
            }
            Err(e) => log::error!("setTimeout failed: {e:?}"),
        }
        id
    }

    fn cancel(&mut self, task: TaskId) {
        let Some(armed) = self.armed.remove(&task) else {
            return;
        };
        match armed.handle {
            Handle::Frame(handle) => {
                if let Err(e) = self.window.cancel_animation_frame(handle) {
                    log::warn!("cancelAnimationFrame failed: {e:?}");
                }
            }
            Handle::Timeout(handle) => self.window.clear_timeout_with_handle(handle),
        }
    }
}
