use einkauf_core::Item;

#[test]
fn new_item_uses_defaults() {
    let item = Item::new(3, None);

    assert_eq!(item.id, 3);
    assert_eq!(item.name, None);
    assert_eq!(item.amount, 0);
    assert_eq!(item.unit_price_cent, 0);
    assert!(item.active);
}

#[test]
fn equality_compares_every_field() {
    let milk = Item::named(1, "Milk", 2, 150);

    assert_eq!(milk, Item::named(1, "Milk", 2, 150));
    assert_ne!(milk, Item::named(2, "Milk", 2, 150));
    assert_ne!(milk, milk.clone().with_active(false));
    assert_ne!(milk, Item::new(1, None).with_amount(2));
}

#[test]
fn overrides_replace_only_targeted_fields() {
    let milk = Item::named(1, "Milk", 2, 150).with_active(false);

    let more = milk.clone().with_amount(5);
    assert_eq!(more.amount, 5);
    assert_eq!(more.name.as_deref(), Some("Milk"));
    assert_eq!(more.unit_price_cent, 150);
    assert!(!more.active);

    let renamed = milk.clone().with_name_and_price("Oat Milk", 180);
    assert_eq!(renamed.name.as_deref(), Some("Oat Milk"));
    assert_eq!(renamed.unit_price_cent, 180);
    assert_eq!(renamed.amount, 2);
    assert!(!renamed.active);

    let reactivated = milk.with_active(true);
    assert_eq!(reactivated, Item::named(1, "Milk", 2, 150));
}

#[test]
fn serialization_uses_expected_wire_fields() {
    let item = Item::named(7, "Bread", 1, 299);

    let json = serde_json::to_value(&item).unwrap();
    assert_eq!(json["id"], 7);
    assert_eq!(json["name"], "Bread");
    assert_eq!(json["amount"], 1);
    assert_eq!(json["unit_price_cent"], 299);
    assert_eq!(json["active"], true);

    let decoded: Item = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, item);
}

#[test]
fn deserialize_fills_missing_fields_with_defaults() {
    let value = serde_json::json!({ "id": 9, "name": null });

    let item: Item = serde_json::from_value(value).unwrap();
    assert_eq!(item, Item::new(9, None));
}

#[test]
fn deserialize_rejects_negative_amount() {
    let value = serde_json::json!({ "id": 9, "name": "Eggs", "amount": -1 });

    assert!(serde_json::from_value::<Item>(value).is_err());
}
