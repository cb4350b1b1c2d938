use crate::property::{Attribute, DataDescriptor, PartialDescriptor, PropertyKey};
use crate::value::JsValue;
use crate::Context;

fn new_object(context: &Context) -> crate::object::JsObject {
    context.construct_object()
}

#[test]
fn define_property_respects_non_configurable() {
    let context = Context::new();
    let object = new_object(&context);

    assert!(object.define_own_property(
        "locked",
        PartialDescriptor::default()
            .value(1)
            .writable(true)
            .enumerable(true)
            .configurable(false),
    ));

    // Flipping configurable back on must fail, forever.
    assert!(!object.define_own_property(
        "locked",
        PartialDescriptor::default().configurable(true),
    ));
    // Changing enumerable on a non-configurable property fails too.
    assert!(!object.define_own_property(
        "locked",
        PartialDescriptor::default().enumerable(false),
    ));
    // A still-writable value may change.
    assert!(object.define_own_property(
        "locked",
        PartialDescriptor::default().value(2),
    ));
    // And writable may transition true -> false, never back.
    assert!(object.define_own_property(
        "locked",
        PartialDescriptor::default().writable(false),
    ));
    assert!(!object.define_own_property(
        "locked",
        PartialDescriptor::default().writable(true),
    ));
    assert!(!object.define_own_property(
        "locked",
        PartialDescriptor::default().value(3),
    ));
}

#[test]
fn freeze_makes_data_properties_non_writable_and_non_configurable() {
    let context = Context::new();
    let object = new_object(&context);
    object.create_data_property("a", 1);
    object.create_data_property("b", 2);

    object.freeze();
    assert!(object.is_frozen());
    assert!(object.is_sealed());

    for key in ["a", "b"] {
        let descriptor = object.get_own_property(&key.into()).unwrap();
        assert!(!descriptor.writable(), "{key} must not be writable");
        assert!(!descriptor.configurable(), "{key} must not be configurable");
    }

    // freeze(freeze(o)) = freeze(o).
    object.freeze();
    assert!(object.is_frozen());
}

#[test]
fn sealed_objects_reject_adds_and_deletes() {
    let context = Context::new();
    let object = new_object(&context);
    object.create_data_property("kept", 1);
    object.seal();

    assert!(object.is_sealed());
    assert!(!object.is_frozen());
    assert!(!object.create_data_property("added", 2));
    assert!(!object.delete(&"kept".into()));

    // Sealed data stays writable.
    let descriptor = object.get_own_property(&"kept".into()).unwrap();
    assert!(descriptor.writable());
}

#[test]
fn get_walks_the_prototype_chain() {
    let mut context = Context::new();
    let parent = new_object(&context);
    parent.create_data_property("inherited", 42);

    let child = new_object(&context);
    assert!(child.set_prototype(parent.clone().into()));

    let value = child
        .get(&"inherited".into(), child.clone().into(), &mut context)
        .unwrap();
    assert_eq!(value.as_number(), Some(42.0));
}

#[test]
fn set_lands_on_the_receiver_not_the_holder() {
    let mut context = Context::new();
    let parent = new_object(&context);
    parent.create_data_property("x", 1);

    let child = new_object(&context);
    assert!(child.set_prototype(parent.clone().into()));

    child
        .set(
            "x".into(),
            JsValue::new(2),
            child.clone().into(),
            false,
            &mut context,
        )
        .unwrap();

    // The parent keeps its value; the child got an own property.
    let parent_value = parent.get_own_property(&"x".into()).unwrap().value().unwrap();
    assert_eq!(parent_value.as_number(), Some(1.0));
    let child_value = child.get_own_property(&"x".into()).unwrap().value().unwrap();
    assert_eq!(child_value.as_number(), Some(2.0));
}

#[test]
fn prototype_cycles_are_rejected() {
    let context = Context::new();
    let a = new_object(&context);
    let b = new_object(&context);
    assert!(b.set_prototype(a.clone().into()));
    // Closing the loop must fail.
    assert!(!a.set_prototype(b.into()));
}

#[test]
fn set_prototype_rejected_on_non_extensible_objects() {
    let context = Context::new();
    let object = new_object(&context);
    let other = new_object(&context);
    object.prevent_extensions();
    assert!(!object.set_prototype(other.into()));
    // Keeping the current prototype is still allowed.
    let current = object.prototype();
    assert!(object.set_prototype(current));
}

#[test]
fn enumeration_order_is_indexes_then_strings_then_symbols() {
    let mut context = Context::new();
    let object = new_object(&context);

    object.create_data_property("zeta", 1);
    object.create_data_property(PropertyKey::Index(5), 2);
    object.create_data_property("alpha", 3);
    object.create_data_property(PropertyKey::Index(2), 4);
    let symbol = context.construct_symbol(Some("tag".into()));
    object.create_data_property(PropertyKey::Symbol(symbol.clone()), 5);

    let keys = object.own_property_keys();
    assert_eq!(
        keys,
        vec![
            PropertyKey::Index(2),
            PropertyKey::Index(5),
            PropertyKey::String("zeta".into()),
            PropertyKey::String("alpha".into()),
            PropertyKey::Symbol(symbol),
        ]
    );
}

#[test]
fn accessors_observe_the_original_receiver() {
    let mut context = Context::new();
    let result = context
        .eval(
            "var base = { get who() { return this.name; } };
             var derived = { name: 'derived' };
             Object.setPrototypeOf(derived, base);
             derived.who",
        )
        .unwrap();
    assert_eq!(result.display().to_string(), "derived");
}

#[test]
fn non_writable_data_properties_reject_writes() {
    let mut context = Context::new();
    let object = new_object(&context);
    object.borrow_mut().insert(
        "fixed",
        DataDescriptor::new(1, Attribute::ENUMERABLE | Attribute::CONFIGURABLE),
    );

    let accepted = object
        .set(
            "fixed".into(),
            JsValue::new(2),
            object.clone().into(),
            false,
            &mut context,
        )
        .unwrap();
    assert!(!accepted);

    // Strict mode throws instead.
    let result = object.set(
        "fixed".into(),
        JsValue::new(2),
        object.clone().into(),
        true,
        &mut context,
    );
    assert!(result.is_err());
}

#[test]
fn array_length_grows_with_index_writes() {
    let mut context = Context::new();
    let array = context.eval("[1, 2, 3]").unwrap();
    let JsValue::Object(array) = array else {
        panic!("expected an array");
    };

    assert_eq!(crate::builtins::array::array_length(&array), 3);

    // In-range writes keep the length.
    array
        .set(
            PropertyKey::Index(1),
            JsValue::new(9),
            array.clone().into(),
            false,
            &mut context,
        )
        .unwrap();
    assert_eq!(crate::builtins::array::array_length(&array), 3);

    // Writing past the end extends it to index + 1.
    array
        .set(
            PropertyKey::Index(7),
            JsValue::new(9),
            array.clone().into(),
            false,
            &mut context,
        )
        .unwrap();
    assert_eq!(crate::builtins::array::array_length(&array), 8);
}

#[test]
fn shrinking_length_deletes_trailing_indexes() {
    let mut context = Context::new();
    let result = context
        .eval("var a = [1, 2, 3, 4]; a.length = 2; a[3] === undefined && a.length === 2")
        .unwrap();
    assert_eq!(result.to_boolean(), true);
}

#[test]
fn shrinking_length_stops_at_a_non_configurable_index() {
    let mut context = Context::new();
    let result = context
        .eval(
            "var a = [1, 2, 3, 4];
             Object.defineProperty(a, 2, { configurable: false });
             a.length = 0;
             a.length",
        )
        .unwrap();
    // The non-configurable index 2 stops the truncation at 3.
    assert_eq!(result.as_number(), Some(3.0));
}

#[test]
fn invalid_array_length_is_a_range_error() {
    let mut context = Context::new();
    let error = context.eval("var a = [1]; a.length = 1.5;").unwrap_err();
    let name = error.get_field("name", &mut context).unwrap();
    assert_eq!(name.display().to_string(), "RangeError");
}
