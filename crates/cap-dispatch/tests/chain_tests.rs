use cap_core::{Node, NodeRef};
use cap_dispatch::{Dispatch, DispatchError, FnResponder, Handler, HandlerRef};
use cap_test_utils::{feeder, AnimalChain};
use proptest::prelude::*;
use std::sync::Arc;

fn req(s: &str) -> String {
    s.to_string()
}

#[test]
fn head_of_chain_routes_to_first_acceptor() {
    let chain = AnimalChain::linked().unwrap();

    assert_eq!(
        chain.monkey.handle(&req("Banana")),
        Dispatch::Handled {
            by: "Monkey".to_string(),
            outcome: "Monkey: I'll eat the Banana.".to_string(),
        }
    );
    assert_eq!(
        chain.monkey.handle(&req("Nut")).into_option().as_deref(),
        Some("Squirrel: I'll eat the Nut.")
    );
    assert_eq!(chain.monkey.handle(&req("Cup of coffee")), Dispatch::Unhandled);
}

#[test]
fn entry_mid_chain_skips_earlier_handlers() {
    let chain = AnimalChain::linked().unwrap();

    assert_eq!(chain.squirrel.handle(&req("Banana")), Dispatch::Unhandled);
    assert_eq!(
        chain.squirrel.handle(&req("MeatBall")).handled_by(),
        Some("Dog")
    );
}

#[test]
fn fluent_linking_links_each_pair_once() {
    let a = feeder("a", "x");
    let b = feeder("b", "y");
    let c = feeder("c", "z");

    let tail = a
        .set_next(Arc::clone(&b))
        .and_then(|b| b.set_next(Arc::clone(&c)))
        .unwrap();

    assert!(Arc::ptr_eq(&tail, &c));
    assert!(Arc::ptr_eq(&a.next().unwrap(), &b));
    assert!(Arc::ptr_eq(&b.next().unwrap(), &c));
    assert!(c.next().is_none());
}

#[test]
fn unlinked_handlers_answer_only_locally() {
    let chain = AnimalChain::unlinked();
    assert!(chain.monkey.handle(&req("Banana")).is_handled());
    assert_eq!(chain.monkey.handle(&req("Nut")), Dispatch::Unhandled);
}

#[test]
fn closing_the_chain_is_rejected() {
    let chain = AnimalChain::linked().unwrap();

    let err = chain.dog.set_next(Arc::clone(&chain.monkey)).unwrap_err();
    assert_eq!(
        err,
        DispatchError::CycleDetected {
            from: "Dog".to_string(),
            to: "Monkey".to_string(),
        }
    );
    assert!(chain.dog.next().is_none());
    assert_eq!(chain.monkey.handle(&req("coffee")), Dispatch::Unhandled);
}

#[test]
fn long_chain_does_not_grow_the_stack() {
    let handlers: Vec<HandlerRef> = (0..10_000)
        .map(|i| feeder(&format!("h{i}"), &format!("food{i}")))
        .collect();
    for pair in handlers.windows(2) {
        pair[0].set_next(Arc::clone(&pair[1])).unwrap();
    }

    assert_eq!(
        handlers[0].handle(&req("food9999")).handled_by(),
        Some("h9999")
    );
    assert_eq!(handlers[0].handle(&req("nothing")), Dispatch::Unhandled);
}

#[test]
fn handler_is_a_node() {
    let chain = AnimalChain::linked().unwrap();
    let node: NodeRef<String, Dispatch<String>> = chain.monkey.clone();

    assert_eq!(node.label(), "Monkey");
    assert_eq!(node.links().len(), 1);
    assert_eq!(node.operation(&req("Nut")).handled_by(), Some("Squirrel"));
}

#[test]
fn dispatch_serializes_with_status_tag() {
    let chain = AnimalChain::linked().unwrap();

    let handled = serde_json::to_value(chain.monkey.handle(&req("Nut"))).unwrap();
    assert_eq!(handled["status"], "handled");
    assert_eq!(handled["by"], "Squirrel");

    let unhandled = serde_json::to_value(chain.monkey.handle(&req("tea"))).unwrap();
    assert_eq!(unhandled, serde_json::json!({ "status": "unhandled" }));
}

fn threshold(name: String, min: u32) -> HandlerRef<u32, String> {
    let reply = name.clone();
    Handler::shared(
        name,
        FnResponder::new(move |n: &u32| *n >= min, move |_: &u32| reply.clone()),
    )
}

proptest! {
    #[test]
    fn first_acceptor_in_chain_order_wins(
        mins in prop::collection::vec(0u32..100, 1..8),
        request in 0u32..100,
    ) {
        let handlers: Vec<_> = mins
            .iter()
            .enumerate()
            .map(|(i, min)| threshold(format!("h{i}"), *min))
            .collect();
        for pair in handlers.windows(2) {
            pair[0].set_next(Arc::clone(&pair[1])).unwrap();
        }

        let expected = mins.iter().position(|min| request >= *min).map(|i| format!("h{i}"));
        let got = handlers[0].handle(&request);

        prop_assert_eq!(got.handled_by().map(str::to_string), expected.clone());
        prop_assert_eq!(got.into_option(), expected);
    }
}
