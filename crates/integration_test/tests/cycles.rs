use std::rc::Rc;

use knit_integration_test::{deref, linked, list_serializer, unlink, walk};
use knit_serialize::{
    Serializer, Skipper,
    graph::{MAPPING, NIL},
    serializer::to_vec,
};
use tracing_test::traced_test;

#[test]
fn open_list_wire_layout() {
    let ser = list_serializer();
    let nodes = linked(&[1, -1], None);

    let bytes = to_vec(&ser, &nodes[0]);

    // zigzag values, IDs in encounter order
    assert_eq!(bytes, [MAPPING, 1, 2, MAPPING, 2, 1, NIL]);
}

#[test]
#[traced_test]
fn five_node_cycle_roundtrip() {
    let ser = list_serializer();
    // 10 -> 20 -> 30 -> 40 -> 50 -> back to 20
    let nodes = linked(&[10, 20, 30, 40, 50], Some(1));

    let bytes = to_vec(&ser, &nodes[0]);
    assert_eq!(ser.size(&nodes[0]), bytes.len());
    assert_eq!(&bytes[bytes.len() - 2..], [MAPPING, 2]);

    let (head, n) = ser.unmarshal(&bytes).unwrap();
    assert_eq!(n, bytes.len());

    let decoded = walk(&head, 6);
    let values: Vec<i64> =
        decoded.iter().map(|node| deref(node).borrow().value).collect();
    assert_eq!(values, [10, 20, 30, 40, 50, 20]);

    // the walk starts at the head and re-enters the cycle at the second node
    assert!(Rc::ptr_eq(deref(&decoded[0]), deref(&head)));
    assert!(Rc::ptr_eq(deref(&decoded[1]), deref(&decoded[5])));
    assert!(!Rc::ptr_eq(deref(&decoded[0]), deref(&decoded[5])));

    assert!(logs_contain("resolved back-reference"));
    assert!(logs_contain("resetting graph tables"));

    unlink(&decoded);
    unlink(&nodes);
}

#[test]
fn five_node_cycle_back_to_head() {
    let ser = list_serializer();
    let nodes = linked(&[1, 2, 3, 4, 5], Some(0));

    let bytes = to_vec(&ser, &nodes[0]);
    assert_eq!(&bytes[bytes.len() - 2..], [MAPPING, 1]);
    assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());

    let (head, n) = ser.unmarshal(&bytes).unwrap();
    assert_eq!(n, bytes.len());

    let decoded = walk(&head, 6);
    let values: Vec<i64> =
        decoded.iter().map(|node| deref(node).borrow().value).collect();
    assert_eq!(values, [1, 2, 3, 4, 5, 1]);

    // the tail's `next` is the decoded head itself
    let tail_next = deref(&decoded[4]).borrow().next.clone();
    assert!(Rc::ptr_eq(deref(&tail_next), deref(&head)));
    assert!(Rc::ptr_eq(deref(&decoded[5]), deref(&head)));

    unlink(&decoded);
    unlink(&nodes);
}

#[test]
fn self_loop() {
    let ser = list_serializer();
    let nodes = linked(&[7], Some(0));

    let bytes = to_vec(&ser, &nodes[0]);
    assert_eq!(bytes, [MAPPING, 1, 14, MAPPING, 1]);
    assert_eq!(ser.skip(&bytes).unwrap(), bytes.len());

    let (head, _) = ser.unmarshal(&bytes).unwrap();
    let node = deref(&head);
    assert!(Rc::ptr_eq(node, deref(&node.borrow().next)));

    unlink(&[head]);
    unlink(&nodes);
}

#[test]
fn truncated_cycle() {
    let ser = list_serializer();
    let nodes = linked(&[1, 2, 3], Some(0));
    let bytes = to_vec(&ser, &nodes[0]);

    for end in 0..bytes.len() {
        let err = ser.unmarshal(&bytes[..end]).unwrap_err();
        assert!(err.is_too_small_input(), "{end}: {err}");
        assert_eq!(err.n(), end);

        let err = ser.skip(&bytes[..end]).unwrap_err();
        assert!(err.is_too_small_input(), "{end}: {err}");
    }

    // the failed calls left nothing behind
    let (head, n) = ser.unmarshal(&bytes).unwrap();
    assert_eq!(n, bytes.len());
    assert_eq!(deref(&head).borrow().value, 1);

    unlink(&walk(&head, 3));
    unlink(&nodes);
}
