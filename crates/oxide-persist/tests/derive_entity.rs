//! Tests for `#[derive(Entity)]` and the INSERT statements it produces.

#![cfg(feature = "derive")]

use oxide_persist::schema::fields;
use oxide_persist::{Entity, GenerationType, InsertQueryBuilder};

// =============================================================================
// Test: identity-generated id and transient flag are both left out
// =============================================================================

#[derive(Debug, Clone, Entity)]
pub struct User {
    #[column(primary_key)]
    #[generated_value(strategy = "identity")]
    pub id: i64,
    pub name: String,
    #[transient]
    pub temp_flag: bool,
}

#[test]
fn test_identity_and_transient_fields_are_excluded() {
    let user = User {
        id: 7,
        name: String::from("Ann"),
        temp_flag: true,
    };
    assert_eq!(
        user.insert_sql().unwrap(),
        "INSERT INTO users (name) VALUES ('Ann');"
    );
}

#[test]
fn test_user_schema_reports_every_field() {
    let names: Vec<&str> = fields::<User>().iter().map(|f| f.name.as_ref()).collect();
    assert_eq!(names, ["id", "name", "temp_flag"]);

    let schema = User::schema();
    assert_eq!(schema.type_name(), "User");
    assert_eq!(schema.table_name(), "users");
    assert_eq!(schema.primary_key().map(|f| f.name.as_ref()), Some("id"));

    let id = schema.field("id").unwrap();
    assert_eq!(id.rust_type, "i64");
    assert_eq!(id.persistence.generated, Some(GenerationType::Identity));
    assert!(schema.field("temp_flag").unwrap().persistence.transient);
}

#[test]
fn test_schema_is_built_once() {
    assert!(std::ptr::eq(User::schema(), User::schema()));
}

// =============================================================================
// Test: sequence-generated id is supplied by the caller
// =============================================================================

#[derive(Debug, Clone, Entity)]
#[table(name = "users")]
pub struct SequencedUser {
    #[generated_value(strategy = "sequence")]
    pub id: i64,
    pub name: String,
}

#[test]
fn test_sequence_id_is_included() {
    let user = SequencedUser {
        id: 7,
        name: String::from("Ann"),
    };
    assert_eq!(
        user.insert_sql().unwrap(),
        "INSERT INTO users (id,name) VALUES (7,'Ann');"
    );
}

#[derive(Debug, Entity)]
pub struct Ticket {
    #[generated_value(strategy = "sequence")]
    pub id: u64,
    pub seat: usize,
}

#[test]
fn test_unsigned_sequence_id_renders_exactly() {
    let ticket = Ticket {
        id: u64::MAX,
        seat: 12,
    };
    assert_eq!(
        ticket.insert_sql().unwrap(),
        "INSERT INTO tickets (id,seat) VALUES (18446744073709551615,12);"
    );
}

// =============================================================================
// Test: no persistable fields
// =============================================================================

#[derive(Debug, Entity)]
pub struct Empty {
    #[transient]
    pub scratch: Vec<String>,
    #[generated_value]
    pub id: i64,
}

#[derive(Debug, Entity)]
pub struct Marker;

#[test]
fn test_no_persistable_fields_renders_empty_lists() {
    let empty = Empty {
        scratch: vec![String::from("x")],
        id: 1,
    };
    assert_eq!(empty.insert_sql().unwrap(), "INSERT INTO empties () VALUES ();");
    assert_eq!(Marker.insert_sql().unwrap(), "INSERT INTO markers () VALUES ();");
}

// =============================================================================
// Test: every strategy other than sequence is excluded
// =============================================================================

#[derive(Debug, Entity)]
#[table(name = "keys")]
pub struct Keys {
    #[generated_value]
    pub auto: i64,
    #[generated_value(strategy = "IDENTITY")]
    pub identity: i64,
    #[generated_value(strategy = "table")]
    pub table: i64,
    #[generated_value(strategy = "uuid")]
    pub uuid: String,
    #[generated_value(strategy = "sequence")]
    pub sequence: i64,
}

#[test]
fn test_only_sequence_strategy_survives() {
    let keys = Keys {
        auto: 1,
        identity: 2,
        table: 3,
        uuid: String::from("u"),
        sequence: 5,
    };
    assert_eq!(
        keys.insert_sql().unwrap(),
        "INSERT INTO keys (sequence) VALUES (5);"
    );

    let auto = Keys::schema().field("auto").unwrap();
    assert_eq!(auto.persistence.generated, Some(GenerationType::Auto));
    assert!(auto.reader.is_none());
}

// =============================================================================
// Test: declaration order drives column and value order
// =============================================================================

#[derive(Debug, Entity)]
#[table(name = "points")]
pub struct PointXy {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Entity)]
#[table(name = "points")]
pub struct PointYx {
    pub y: i32,
    pub x: i32,
}

#[test]
fn test_declaration_order_is_preserved() {
    assert_eq!(
        PointXy { x: 1, y: 2 }.insert_sql().unwrap(),
        "INSERT INTO points (x,y) VALUES (1,2);"
    );
    assert_eq!(
        PointYx { y: 2, x: 1 }.insert_sql().unwrap(),
        "INSERT INTO points (y,x) VALUES (2,1);"
    );
}

// =============================================================================
// Test: column overrides, value rendering and default table naming
// =============================================================================

#[derive(Debug, Entity)]
pub struct LineItem {
    #[column(name = "item_sku")]
    pub sku: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub gift: bool,
    pub note: Option<String>,
    pub coupon: Option<String>,
}

#[test]
fn test_values_render_by_type() {
    let item = LineItem {
        sku: String::from("O'Neil-1"),
        quantity: 3,
        unit_price: 9.5,
        gift: false,
        note: None,
        coupon: Some(String::from("SPRING")),
    };
    let builder = InsertQueryBuilder::new(&item).unwrap();

    assert_eq!(builder.table().name(), "line_items");
    assert_eq!(
        builder.build(),
        "INSERT INTO line_items (item_sku,quantity,unit_price,gift,note,coupon) \
         VALUES ('O''Neil-1',3,9.5,FALSE,NULL,'SPRING');"
    );
}

// =============================================================================
// Test: builders bind to one instance
// =============================================================================

#[test]
fn test_builders_over_different_instances_are_independent() {
    let ann = User {
        id: 1,
        name: String::from("Ann"),
        temp_flag: false,
    };
    let bob = User {
        name: String::from("Bob"),
        ..ann.clone()
    };

    let first = InsertQueryBuilder::new(&ann).unwrap();
    let second = InsertQueryBuilder::new(&bob).unwrap();

    assert_eq!(first.build(), "INSERT INTO users (name) VALUES ('Ann');");
    assert_eq!(second.build(), "INSERT INTO users (name) VALUES ('Bob');");
    assert_eq!(first.build(), first.build());
}

#[test]
fn test_columns_and_values_stay_aligned() {
    let item = LineItem {
        sku: String::from("A"),
        quantity: 1,
        unit_price: 1.0,
        gift: true,
        note: Some(String::from("n")),
        coupon: None,
    };
    let builder = InsertQueryBuilder::new(&item).unwrap();
    let pairs: Vec<(&str, &str)> = builder
        .columns()
        .iter()
        .map(|c| c.name())
        .zip(builder.values().iter().map(|v| v.text()))
        .collect();

    assert_eq!(
        pairs,
        [
            ("item_sku", "'A'"),
            ("quantity", "1"),
            ("unit_price", "1"),
            ("gift", "TRUE"),
            ("note", "'n'"),
            ("coupon", "NULL"),
        ]
    );
}
