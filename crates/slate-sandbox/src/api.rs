//! Capability surface registered into the sandbox engine
//!
//! Only what is registered here is resolvable from script text; there is
//! no ambient access to host globals, the filesystem, or the network.

use std::cell::RefCell;
use std::rc::Rc;

use rhai::{Array, Dynamic, Engine, EvalAltResult, FnPtr, ImmutableString, Map, Position};

use slate_bus::{BusMessage, MessageBus};
use slate_desktop::math::{Size, Vec2};
use slate_desktop::{WindowConfig, WindowRegistry, WindowUpdate};
use slate_proc::{Pid, ScriptError};

use crate::sandbox::SharedState;

/// Console capability object, pushed into scope as the `console` constant.
#[derive(Clone)]
pub(crate) struct Console;

/// Script-side handle to a desktop window.
#[derive(Clone)]
pub(crate) struct WindowHandle {
    id: ImmutableString,
    registry: Rc<RefCell<WindowRegistry>>,
}

/// Script-side application lifecycle handle.
#[derive(Clone)]
pub(crate) struct AppHandle {
    id: ImmutableString,
}

/// Register the whole capability surface for one program.
pub(crate) fn register_api(
    engine: &mut Engine,
    pid: Pid,
    state: Rc<RefCell<SharedState>>,
    bus: Rc<MessageBus>,
    windows: Rc<RefCell<WindowRegistry>>,
) {
    register_console(engine, pid, bus.clone());
    register_timers(engine, state.clone());
    register_messaging(engine, pid, state.clone(), bus.clone());
    register_lifecycle(engine, state.clone());
    register_windows(engine, pid, state.clone(), windows);
    register_app(engine, pid, state, bus);
}

fn terminated() -> Box<EvalAltResult> {
    EvalAltResult::ErrorTerminated(Dynamic::UNIT, Position::NONE).into()
}

fn register_console(engine: &mut Engine, pid: Pid, bus: Rc<MessageBus>) {
    engine.register_type_with_name::<Console>("Console");

    let sink = bus.clone();
    engine.register_fn("log", move |_: &mut Console, value: Dynamic| {
        sink.publish(pid, &BusMessage::Log(value.to_string()));
    });
    let sink = bus.clone();
    engine.register_fn("warn", move |_: &mut Console, value: Dynamic| {
        sink.publish(pid, &BusMessage::Warn(value.to_string()));
    });
    let sink = bus.clone();
    engine.register_fn("error", move |_: &mut Console, value: Dynamic| {
        sink.publish(
            pid,
            &BusMessage::Error(ScriptError::new("Error", value.to_string())),
        );
    });

    // Free-function forms: named script functions do not capture the
    // enclosing scope, so they cannot see the `console` constant.
    let sink = bus.clone();
    engine.register_fn("log", move |value: Dynamic| {
        sink.publish(pid, &BusMessage::Log(value.to_string()));
    });
    let sink = bus.clone();
    engine.register_fn("warn", move |value: Dynamic| {
        sink.publish(pid, &BusMessage::Warn(value.to_string()));
    });
    let sink = bus;
    engine.register_fn("error", move |value: Dynamic| {
        sink.publish(
            pid,
            &BusMessage::Error(ScriptError::new("Error", value.to_string())),
        );
    });
}

fn register_timers(engine: &mut Engine, state: Rc<RefCell<SharedState>>) {
    let s = state.clone();
    engine.register_fn("set_timeout", move |callback: FnPtr, delay_ms: i64| -> i64 {
        let mut s = s.borrow_mut();
        let now = s.now_ms;
        s.timers.insert_timeout(callback, delay_ms.max(0) as u64, now) as i64
    });
    let s = state.clone();
    engine.register_fn("clear_timeout", move |handle: i64| {
        s.borrow_mut().timers.cancel(handle.max(0) as u64);
    });

    let s = state.clone();
    engine.register_fn(
        "set_interval",
        move |callback: FnPtr, period_ms: i64| -> i64 {
            let mut s = s.borrow_mut();
            let now = s.now_ms;
            s.timers.insert_interval(callback, period_ms.max(0) as u64, now) as i64
        },
    );
    let s = state.clone();
    engine.register_fn("clear_interval", move |handle: i64| {
        s.borrow_mut().timers.cancel(handle.max(0) as u64);
    });

    let s = state.clone();
    engine.register_fn("request_animation_frame", move |callback: FnPtr| -> i64 {
        s.borrow_mut().frames.insert(callback) as i64
    });
    let s = state;
    engine.register_fn("cancel_animation_frame", move |handle: i64| {
        s.borrow_mut().frames.cancel(handle.max(0) as u64);
    });
}

fn register_messaging(
    engine: &mut Engine,
    pid: Pid,
    state: Rc<RefCell<SharedState>>,
    bus: Rc<MessageBus>,
) {
    engine.register_fn(
        "post_message",
        move |payload: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let value: serde_json::Value = rhai::serde::from_dynamic(&payload)?;
            bus.publish(pid, &BusMessage::Message(value));
            Ok(())
        },
    );

    let s = state.clone();
    engine.register_fn("on_message", move |callback: FnPtr| {
        s.borrow_mut().message_listeners.push(callback);
    });
    let s = state;
    engine.register_fn("off_message", move |callback: FnPtr| {
        // Anonymous functions carry unique names, so comparing names removes
        // exactly the function reference that was registered.
        s.borrow_mut()
            .message_listeners
            .retain(|listener| listener.fn_name() != callback.fn_name());
    });
}

fn register_lifecycle(engine: &mut Engine, state: Rc<RefCell<SharedState>>) {
    let s = state.clone();
    engine.register_fn("on_close", move |predicate: FnPtr| {
        s.borrow_mut().close_handler = Some(predicate);
    });

    let s = state.clone();
    engine.register_fn("exit", move |code: i64| -> Result<(), Box<EvalAltResult>> {
        s.borrow_mut().exit_code = Some(code);
        Err(terminated())
    });
    let s = state;
    engine.register_fn("exit", move || -> Result<(), Box<EvalAltResult>> {
        s.borrow_mut().exit_code = Some(0);
        Err(terminated())
    });
}

fn register_windows(
    engine: &mut Engine,
    pid: Pid,
    state: Rc<RefCell<SharedState>>,
    registry: Rc<RefCell<WindowRegistry>>,
) {
    engine.register_type_with_name::<WindowHandle>("Window");

    let reg = registry.clone();
    engine.register_fn(
        "Window",
        move |options: Map| -> Result<WindowHandle, Box<EvalAltResult>> {
            let position = match (get_f32(&options, "x"), get_f32(&options, "y")) {
                (Some(x), Some(y)) => Some(Vec2::new(x, y)),
                _ => None,
            };
            let size = match (get_f32(&options, "width"), get_f32(&options, "height")) {
                (Some(width), Some(height)) => Some(Size::new(width, height)),
                _ => None,
            };
            let config = WindowConfig {
                id: get_string(&options, "id").unwrap_or_default(),
                title: get_string(&options, "title").unwrap_or_default(),
                app_id: format!("pid:{pid}"),
                position,
                size,
                no_resize: get_bool(&options, "no_resize"),
                no_controls: get_bool(&options, "no_controls"),
                file_path: get_string(&options, "file_path"),
                picker: None,
            };
            let id = reg.borrow_mut().create(config).map_err(|err| {
                Box::new(EvalAltResult::ErrorRuntime(
                    err.to_string().into(),
                    Position::NONE,
                ))
            })?;
            Ok(WindowHandle {
                id: id.into(),
                registry: reg.clone(),
            })
        },
    );

    engine.register_get("id", |window: &mut WindowHandle| window.id.clone());

    engine.register_fn("close", |window: &mut WindowHandle| {
        window.registry.borrow_mut().close(window.id.as_str());
    });
    engine.register_fn(
        "set_title",
        |window: &mut WindowHandle, title: ImmutableString| {
            window.registry.borrow_mut().update(
                window.id.as_str(),
                WindowUpdate {
                    title: Some(title.to_string()),
                    ..Default::default()
                },
            );
        },
    );
    engine.register_fn("set_position", |window: &mut WindowHandle, x: f64, y: f64| {
        window
            .registry
            .borrow_mut()
            .move_window(window.id.as_str(), Vec2::new(x as f32, y as f32), false);
    });
    engine.register_fn("set_position", |window: &mut WindowHandle, x: i64, y: i64| {
        window
            .registry
            .borrow_mut()
            .move_window(window.id.as_str(), Vec2::new(x as f32, y as f32), false);
    });
    engine.register_fn(
        "set_size",
        |window: &mut WindowHandle, width: f64, height: f64| {
            window.registry.borrow_mut().resize(
                window.id.as_str(),
                Size::new(width as f32, height as f32),
                None,
            );
        },
    );
    engine.register_fn(
        "set_size",
        |window: &mut WindowHandle, width: i64, height: i64| {
            window.registry.borrow_mut().resize(
                window.id.as_str(),
                Size::new(width as f32, height as f32),
                None,
            );
        },
    );
    engine.register_fn("focus", |window: &mut WindowHandle| {
        window
            .registry
            .borrow_mut()
            .focus(Some(window.id.as_str()));
    });
    engine.register_fn("minimize", |window: &mut WindowHandle| {
        window.registry.borrow_mut().minimize(window.id.as_str());
    });
    engine.register_fn("restore", |window: &mut WindowHandle| {
        window.registry.borrow_mut().restore(window.id.as_str());
    });

    // Window-level close interception routes to the process close handler.
    let s = state;
    engine.register_fn(
        "on_close",
        move |_: &mut WindowHandle, predicate: FnPtr| {
            s.borrow_mut().close_handler = Some(predicate);
        },
    );

    let reg = registry;
    engine.register_fn("get_windows", move || -> Array {
        reg.borrow()
            .windows()
            .iter()
            .map(|window| {
                let mut entry = Map::new();
                entry.insert("id".into(), window.id.clone().into());
                entry.insert("title".into(), window.title.clone().into());
                Dynamic::from(entry)
            })
            .collect()
    });
}

fn register_app(
    engine: &mut Engine,
    pid: Pid,
    state: Rc<RefCell<SharedState>>,
    bus: Rc<MessageBus>,
) {
    engine.register_type_with_name::<AppHandle>("App");

    engine.register_fn("App", |id: ImmutableString| AppHandle { id });
    engine.register_get("id", |app: &mut AppHandle| app.id.clone());

    let s = state.clone();
    engine.register_fn(
        "on",
        move |_: &mut AppHandle, event: ImmutableString, callback: FnPtr| {
            if event.as_str() == "message" {
                s.borrow_mut().message_listeners.push(callback);
            }
        },
    );
    engine.register_fn(
        "send",
        move |_: &mut AppHandle, payload: Dynamic| -> Result<(), Box<EvalAltResult>> {
            let value: serde_json::Value = rhai::serde::from_dynamic(&payload)?;
            bus.publish(pid, &BusMessage::Message(value));
            Ok(())
        },
    );
    let s = state.clone();
    engine.register_fn("init", move |_: &mut AppHandle, callback: FnPtr| {
        s.borrow_mut().init_hook = Some(callback);
    });
    let s = state.clone();
    engine.register_fn("main", move |_: &mut AppHandle, callback: FnPtr| {
        s.borrow_mut().main_hook = Some(callback);
    });
    let s = state;
    engine.register_fn(
        "exit",
        move |_: &mut AppHandle, code: i64| -> Result<(), Box<EvalAltResult>> {
            s.borrow_mut().exit_code = Some(code);
            Err(terminated())
        },
    );
}

fn get_string(options: &Map, key: &str) -> Option<String> {
    options.get(key).and_then(|v| v.clone().into_string().ok())
}

fn get_f32(options: &Map, key: &str) -> Option<f32> {
    let value = options.get(key)?;
    if let Ok(int) = value.as_int() {
        return Some(int as f32);
    }
    value.as_float().ok().map(|f| f as f32)
}

fn get_bool(options: &Map, key: &str) -> bool {
    options
        .get(key)
        .and_then(|v| v.as_bool().ok())
        .unwrap_or(false)
}
