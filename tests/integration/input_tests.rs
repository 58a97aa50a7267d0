//! Integration tests for scoped input dispatch outside the controller.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};

use pikite::input::{
    callback, ButtonId, ButtonMap, InputCommand, InputHandler, InputSource, SCOPE_CAPTURE,
    SCOPE_MENU,
};

#[derive(Default)]
struct Counter {
    hits: u32,
    last_source: Option<InputSource>,
    last_context: Value,
}

#[test]
fn callback_fires_only_in_its_scope() {
    let mut handler: InputHandler<Counter> = InputHandler::default();
    let mut ctx = Counter::default();
    let cb = callback(|c: &mut Counter, src, value: &Value| {
        c.hits += 1;
        c.last_source = Some(src);
        c.last_context = value.clone();
        Ok(())
    });
    handler.register(SCOPE_MENU, InputCommand::Next, cb);

    // Bound but inactive scope: nothing happens.
    handler.handle(&mut ctx, InputCommand::Next, InputSource::Gpio, &Value::Null);
    assert_eq!(ctx.hits, 0);

    handler.set_scope(SCOPE_MENU);
    let report = handler.handle(
        &mut ctx,
        InputCommand::Next,
        InputSource::Network,
        &json!({"n": 1}),
    );
    assert_eq!(report.invoked, 1);
    assert_eq!(ctx.hits, 1);
    assert_eq!(ctx.last_source, Some(InputSource::Network));
    assert_eq!(ctx.last_context, json!({"n": 1}));

    handler.set_scope(SCOPE_CAPTURE);
    handler.handle(&mut ctx, InputCommand::Next, InputSource::Gpio, &Value::Null);
    assert_eq!(ctx.hits, 1);
}

#[test]
fn switching_back_restores_bindings() {
    let mut handler: InputHandler<Counter> = InputHandler::new(SCOPE_MENU);
    let mut ctx = Counter::default();
    handler.register(
        SCOPE_MENU,
        InputCommand::Select,
        callback(|c: &mut Counter, _, _| {
            c.hits += 1;
            Ok(())
        }),
    );

    handler.set_scope(SCOPE_CAPTURE);
    handler.set_scope(SCOPE_MENU);
    handler.handle(&mut ctx, InputCommand::Select, InputSource::Gpio, &Value::Null);
    assert_eq!(ctx.hits, 1);
}

#[test]
fn callbacks_run_in_registration_order() {
    let order = Rc::new(RefCell::new(Vec::new()));
    let mut handler: InputHandler<()> = InputHandler::new(SCOPE_MENU);

    for tag in ["first", "second", "third"] {
        let order = order.clone();
        handler.register(
            SCOPE_MENU,
            InputCommand::Back,
            callback(move |_: &mut (), _, _| {
                order.borrow_mut().push(tag);
                Ok(())
            }),
        );
    }

    handler.handle(&mut (), InputCommand::Back, InputSource::System, &Value::Null);
    assert_eq!(*order.borrow(), ["first", "second", "third"]);
}

#[test]
fn standard_button_map_per_scope() {
    let map = ButtonMap::standard();
    assert_eq!(map.resolve(SCOPE_MENU, ButtonId::Select), InputCommand::Select);
    assert_eq!(map.resolve(SCOPE_MENU, ButtonId::Next), InputCommand::Next);
    assert_eq!(map.resolve(SCOPE_CAPTURE, ButtonId::Select), InputCommand::StopCapture);
    assert_eq!(map.resolve(SCOPE_CAPTURE, ButtonId::Next), InputCommand::PauseResume);
    assert_eq!(map.resolve(SCOPE_CAPTURE, ButtonId::Back), InputCommand::Back);
}

#[test]
fn commands_parse_from_text() {
    assert_eq!("NEXT".parse::<InputCommand>().unwrap(), InputCommand::Next);
    assert_eq!("pause_resume".parse::<InputCommand>().unwrap(), InputCommand::PauseResume);
    assert!("jump".parse::<InputCommand>().is_err());
}
