//! End-to-end codec scenarios over a small model menagerie.

use crate::Facet;
use crate::cipher::{Base64Cipher, Cipher};
use crate::codec::JsonCodec;
use crate::config::Config;
use crate::error::CodecError;
use crate::impl_facet;
use crate::info::{ConstructorSpec, MemberDescriptor, ParamSpec, ScalarConverter, TypeDescriptor};
use crate::registry::{Describe, DescriptorRegistry, DescriptorRegistryArc};

// -----------------------------------------------------------------------------
// Model menagerie

#[derive(Debug, Default, PartialEq)]
struct Baz {
    qux: String,
    garply: bool,
}
impl_facet!(Baz);

impl Describe for Baz {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Baz>()
            .zero_arg(Baz::default)
            .member(
                MemberDescriptor::required("qux", |b: &Baz| &b.qux)
                    .writable(|b: &mut Baz, v| b.qux = v)
                    .rename("Qux"),
            )
            .member(
                MemberDescriptor::required("garply", |b: &Baz| &b.garply)
                    .writable(|b: &mut Baz, v| b.garply = v)
                    .rename("Garply"),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Bar {
    baz: Option<Baz>,
    corge: f64,
}
impl_facet!(Bar);

impl Describe for Bar {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Bar>()
            .zero_arg(Bar::default)
            .member(
                MemberDescriptor::optional("baz", |b: &Bar| b.baz.as_ref())
                    .writable(|b: &mut Bar, v| b.baz = Some(v))
                    .rename("Baz"),
            )
            .member(
                MemberDescriptor::required("corge", |b: &Bar| &b.corge)
                    .writable(|b: &mut Bar, v| b.corge = v)
                    .rename("Corge"),
            )
            .finish()
    }

    fn register_dependencies(registry: &mut DescriptorRegistry) {
        registry.register::<Baz>();
    }
}

// Abstract markers. `Beverage` has no type-level mapping; `Brew` maps to
// `Tea` through its type attribute.
struct Beverage;
struct Brew;

#[derive(Debug, Default, PartialEq)]
struct Coffee {
    strength: i32,
}
impl_facet!(Coffee);

impl Describe for Coffee {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Coffee>()
            .zero_arg(Coffee::default)
            .implements::<Beverage>()
            .implements::<Brew>()
            .member(
                MemberDescriptor::required("strength", |c: &Coffee| &c.strength)
                    .writable(|c: &mut Coffee, v| c.strength = v)
                    .rename("Strength"),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Tea {
    sweet: bool,
}
impl_facet!(Tea);

impl Describe for Tea {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Tea>()
            .zero_arg(Tea::default)
            .implements::<Beverage>()
            .implements::<Brew>()
            .member(
                MemberDescriptor::required("sweet", |t: &Tea| &t.sweet)
                    .writable(|t: &mut Tea, v| t.sweet = v)
                    .rename("Sweet"),
            )
            .finish()
    }
}

#[derive(Default)]
struct Menu {
    // Declared `Beverage`, member attribute maps it to `Coffee`.
    drink: Option<Box<dyn Facet>>,
    // Declared `Brew`, no member attribute.
    brew: Option<Box<dyn Facet>>,
}
impl_facet!(Menu);

impl Describe for Menu {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Menu>()
            .zero_arg(Menu::default)
            .member(
                MemberDescriptor::poly::<Beverage, Menu>("drink", |m| m.drink.as_deref())
                    .writable_poly(|m: &mut Menu, v| m.drink = Some(v))
                    .mapped::<Coffee>()
                    .rename("Drink"),
            )
            .member(
                MemberDescriptor::poly::<Brew, Menu>("brew", |m| m.brew.as_deref())
                    .writable_poly(|m: &mut Menu, v| m.brew = Some(v))
                    .rename("Brew"),
            )
            .finish()
    }
}

struct Mystery;

#[derive(Debug, Default)]
struct MysteryBox {
    inner: Option<Box<dyn Facet>>,
}
impl_facet!(MysteryBox);

impl Describe for MysteryBox {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<MysteryBox>()
            .zero_arg(MysteryBox::default)
            .member(
                MemberDescriptor::poly::<Mystery, MysteryBox>("inner", |m| m.inner.as_deref())
                    .writable_poly(|m: &mut MysteryBox, v| m.inner = Some(v))
                    .rename("Inner"),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Widget {
    size: i64,
}
impl_facet!(Widget);

impl Describe for Widget {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Widget>()
            .zero_arg(Widget::default)
            .member(
                MemberDescriptor::required("size", |w: &Widget| &w.size)
                    .writable(|w: &mut Widget, v| w.size = v)
                    .rename("Size"),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
struct WidgetDerived {
    size: i64,
    label: String,
}
impl_facet!(WidgetDerived);

impl Describe for WidgetDerived {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<WidgetDerived>()
            .zero_arg(WidgetDerived::default)
            .implements::<Widget>()
            .member(
                MemberDescriptor::required("size", |w: &WidgetDerived| &w.size)
                    .writable(|w: &mut WidgetDerived, v| w.size = v)
                    .rename("Size"),
            )
            .member(
                MemberDescriptor::required("label", |w: &WidgetDerived| &w.label)
                    .writable(|w: &mut WidgetDerived, v| w.label = v)
                    .rename("Label"),
            )
            .finish()
    }
}

// Whole-type encrypt marker.
#[derive(Debug, Default, PartialEq)]
struct Grault {
    qux: String,
    garply: bool,
}
impl_facet!(Grault);

impl Describe for Grault {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Grault>()
            .zero_arg(Grault::default)
            .encrypt()
            .member(
                MemberDescriptor::required("qux", |g: &Grault| &g.qux)
                    .writable(|g: &mut Grault, v| g.qux = v)
                    .rename("Qux"),
            )
            .member(
                MemberDescriptor::required("garply", |g: &Grault| &g.garply)
                    .writable(|g: &mut Grault, v| g.garply = v)
                    .rename("Garply"),
            )
            .finish()
    }
}

// Member encrypt marker over an already-marked type.
#[derive(Debug, Default, PartialEq)]
struct Waldo {
    grault: Option<Grault>,
}
impl_facet!(Waldo);

impl Describe for Waldo {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Waldo>()
            .zero_arg(Waldo::default)
            .member(
                MemberDescriptor::optional("grault", |w: &Waldo| w.grault.as_ref())
                    .writable(|w: &mut Waldo, v| w.grault = Some(v))
                    .encrypt()
                    .rename("Grault"),
            )
            .finish()
    }

    fn register_dependencies(registry: &mut DescriptorRegistry) {
        registry.register::<Grault>();
    }
}

#[derive(Debug, Default, PartialEq)]
struct Secrets {
    password: String,
    armed: bool,
}
impl_facet!(Secrets);

impl Describe for Secrets {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Secrets>()
            .zero_arg(Secrets::default)
            .member(
                MemberDescriptor::required("password", |s: &Secrets| &s.password)
                    .writable(|s: &mut Secrets, v| s.password = v)
                    .encrypt()
                    .rename("Password"),
            )
            .member(
                MemberDescriptor::required("armed", |s: &Secrets| &s.armed)
                    .writable(|s: &mut Secrets, v| s.armed = v)
                    .encrypt()
                    .rename("Armed"),
            )
            .finish()
    }
}

#[derive(Debug, Default, PartialEq)]
struct Badge {
    code: String,
    num: i64,
}
impl_facet!(Badge);

impl Describe for Badge {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Badge>()
            .zero_arg(Badge::default)
            .member(
                MemberDescriptor::required("code", |b: &Badge| &b.code)
                    .writable(|b: &mut Badge, v| b.code = v)
                    .redact()
                    .rename("Code"),
            )
            .member(
                MemberDescriptor::required("num", |b: &Badge| &b.num)
                    .writable(|b: &mut Badge, v| b.num = v)
                    .redact()
                    .rename("Num"),
            )
            .finish()
    }
}

// Constructed members only, no setters.
#[derive(Debug, PartialEq)]
struct Account {
    id: i64,
    owner: String,
}
impl_facet!(Account);

impl Describe for Account {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Account>()
            .constructor(ConstructorSpec::new(
                [ParamSpec::new::<i64>("Id"), ParamSpec::new::<String>("OWNER")],
                |args| {
                    Ok(Box::new(Account {
                        id: args.take(0)?,
                        owner: args.take(1)?,
                    }))
                },
            ))
            .member(MemberDescriptor::required("id", |a: &Account| &a.id).rename("Id"))
            .member(MemberDescriptor::required("owner", |a: &Account| &a.owner).rename("Owner"))
            .finish()
    }
}

// Two constructors, none designated: unusable for deserialization.
#[derive(Debug, PartialEq)]
struct Fork {
    tines: i64,
}
impl_facet!(Fork);

impl Describe for Fork {
    fn describe() -> TypeDescriptor {
        let ctor = || {
            ConstructorSpec::new([ParamSpec::new::<i64>("tines")], |args| {
                Ok(Box::new(Fork {
                    tines: args.take(0)?,
                }))
            })
        };
        TypeDescriptor::structure::<Fork>()
            .constructor(ctor())
            .constructor(ctor())
            .member(MemberDescriptor::required("tines", |f: &Fork| &f.tines).rename("Tines"))
            .finish()
    }
}

// Two constructors, both designated: just as unusable.
#[derive(Debug, PartialEq)]
struct Knife {
    edges: i64,
}
impl_facet!(Knife);

impl Describe for Knife {
    fn describe() -> TypeDescriptor {
        let ctor = || {
            ConstructorSpec::new([ParamSpec::new::<i64>("edges")], |args| {
                Ok(Box::new(Knife {
                    edges: args.take(0)?,
                }))
            })
            .designated()
        };
        TypeDescriptor::structure::<Knife>()
            .constructor(ctor())
            .constructor(ctor())
            .member(MemberDescriptor::required("edges", |k: &Knife| &k.edges).rename("Edges"))
            .finish()
    }
}

// Constructor-injected collection that is also writable.
#[derive(Debug, Default, PartialEq)]
struct Basket {
    items: Vec<String>,
}
impl_facet!(Basket);

impl Describe for Basket {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Basket>()
            .constructor(ConstructorSpec::new(
                [ParamSpec::new::<Vec<String>>("items")],
                |args| {
                    Ok(Box::new(Basket {
                        items: args.take(0)?,
                    }))
                },
            ))
            .member(
                MemberDescriptor::required("items", |b: &Basket| &b.items)
                    .writable(|b: &mut Basket, v| b.items = v)
                    .rename("Items"),
            )
            .finish()
    }

    fn register_dependencies(registry: &mut DescriptorRegistry) {
        registry.register::<Vec<String>>();
    }
}

// Codec-visible only through a config scalar override.
#[derive(Debug, Default, PartialEq)]
struct Celsius(f64);
impl_facet!(Celsius);

#[derive(Debug, Default, PartialEq)]
struct Shelf {
    tags: Vec<String>,
}
impl_facet!(Shelf);

impl Describe for Shelf {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::structure::<Shelf>()
            .zero_arg(Shelf::default)
            .member(
                MemberDescriptor::required("tags", |s: &Shelf| &s.tags)
                    .writable(|s: &mut Shelf, v| s.tags = v)
                    .rename("Tags"),
            )
            .finish()
    }

    fn register_dependencies(registry: &mut DescriptorRegistry) {
        registry.register::<Vec<String>>();
    }
}

// -----------------------------------------------------------------------------
// Helpers

fn registry() -> DescriptorRegistryArc {
    let registry = DescriptorRegistryArc::default();
    {
        let mut reg = registry.write();
        reg.register::<Bar>();
        reg.register::<Menu>();
        reg.register::<MysteryBox>();
        reg.register::<Coffee>();
        reg.register::<Tea>();
        reg.register::<Widget>();
        reg.register::<WidgetDerived>();
        reg.register::<Waldo>();
        reg.register::<Secrets>();
        reg.register::<Badge>();
        reg.register::<Account>();
        reg.register::<Basket>();
        reg.register::<Fork>();
        reg.register::<Knife>();
        reg.register::<Shelf>();
        reg.try_insert(TypeDescriptor::abstract_marker::<Beverage>());
        reg.try_insert(TypeDescriptor::abstract_marker::<Brew>().with_type_mapping::<Tea>());
        reg.try_insert(TypeDescriptor::abstract_marker::<Mystery>());
    }
    registry
}

fn codec(config: Config) -> JsonCodec {
    JsonCodec::new(registry(), config)
}

// -----------------------------------------------------------------------------
// Basic round trips

#[test]
fn nested_object_round_trip() {
    let codec = codec(Config::default());
    let bar = Bar {
        baz: Some(Baz {
            qux: String::from("abc"),
            garply: true,
        }),
        corge: 1.5,
    };

    let json = codec.to_string(&bar).unwrap();
    assert_eq!(json, r#"{"Baz":{"Qux":"abc","Garply":true},"Corge":1.5}"#);

    let back: Bar = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, bar);
}

#[test]
fn absent_optional_emits_nothing() {
    let codec = codec(Config::default());
    let json = codec.to_string(&Bar::default()).unwrap();
    assert_eq!(json, r#"{"Corge":0.0}"#);
}

#[test]
fn null_document_is_none_both_ways() {
    let codec = codec(Config::default());
    assert_eq!(codec.to_string_dyn(None).unwrap(), "null");
    assert_eq!(codec.from_str::<Bar>("null").unwrap(), None);
}

#[test]
fn empty_object_is_a_default_instance() {
    let codec = codec(Config::default());
    let bar: Bar = codec.from_str("{}").unwrap().unwrap();
    assert_eq!(bar, Bar::default());
}

#[test]
fn explicit_null_member_stays_default() {
    let codec = codec(Config::default());
    let bar: Bar = codec
        .from_str(r#"{"Baz":null,"Corge":2.5}"#)
        .unwrap()
        .unwrap();
    assert_eq!(bar.baz, None);
    assert_eq!(bar.corge, 2.5);
}

#[test]
fn unknown_keys_are_skipped() {
    let codec = codec(Config::default());
    let bar: Bar = codec
        .from_str(r#"{"Nope":[1,2],"Corge":3.5,"Extra":{"Deep":true}}"#)
        .unwrap()
        .unwrap();
    assert_eq!(bar.corge, 3.5);
}

#[test]
fn malformed_text_is_reported_as_such() {
    let codec = codec(Config::default());
    let err = codec.from_str::<Bar>(r#"{"Corge""#).unwrap_err();
    assert!(matches!(err, CodecError::MalformedInput { .. }));
}

#[test]
fn list_members_round_trip() {
    let codec = codec(Config::default());
    let shelf = Shelf {
        tags: vec![String::from("a"), String::from("b")],
    };

    let json = codec.to_string(&shelf).unwrap();
    assert_eq!(json, r#"{"Tags":["a","b"]}"#);

    let back: Shelf = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, shelf);
}

// -----------------------------------------------------------------------------
// Polymorphic resolution

#[test]
fn member_attribute_resolves_the_marker() {
    let codec = codec(Config::default());
    let menu: Menu = codec
        .from_str(r#"{"Drink":{"Strength":3}}"#)
        .unwrap()
        .unwrap();

    let drink = menu.drink.unwrap();
    assert_eq!(drink.downcast_ref::<Coffee>(), Some(&Coffee { strength: 3 }));
}

#[test]
fn type_attribute_resolves_when_no_member_attribute() {
    let codec = codec(Config::default());
    let menu: Menu = codec.from_str(r#"{"Brew":{"Sweet":true}}"#).unwrap().unwrap();

    let brew = menu.brew.unwrap();
    assert_eq!(brew.downcast_ref::<Tea>(), Some(&Tea { sweet: true }));
}

#[test]
fn config_by_type_outranks_the_type_attribute() {
    let config = Config::builder().map_type::<Brew, Coffee>().build();
    let codec = codec(config);
    let menu: Menu = codec
        .from_str(r#"{"Brew":{"Strength":9}}"#)
        .unwrap()
        .unwrap();

    let brew = menu.brew.unwrap();
    assert_eq!(brew.downcast_ref::<Coffee>(), Some(&Coffee { strength: 9 }));
}

#[test]
fn config_by_type_outranks_the_member_attribute() {
    // `Menu.drink` carries a member attribute mapping to `Coffee`.
    let config = Config::builder().map_type::<Beverage, Tea>().build();
    let codec = codec(config);
    let menu: Menu = codec.from_str(r#"{"Drink":{"Sweet":true}}"#).unwrap().unwrap();

    let drink = menu.drink.unwrap();
    assert_eq!(drink.downcast_ref::<Tea>(), Some(&Tea { sweet: true }));
}

#[test]
fn config_by_member_outranks_everything() {
    let config = Config::builder()
        .map_type::<Beverage, Coffee>()
        .map_member::<Menu, Tea>("drink")
        .build();
    let codec = codec(config);
    let menu: Menu = codec.from_str(r#"{"Drink":{"Sweet":true}}"#).unwrap().unwrap();

    let drink = menu.drink.unwrap();
    assert_eq!(drink.downcast_ref::<Tea>(), Some(&Tea { sweet: true }));
}

#[test]
fn config_by_member_outranks_config_by_type() {
    let config = Config::builder()
        .map_type::<Brew, Tea>()
        .map_member::<Menu, Coffee>("brew")
        .build();
    let codec = codec(config);
    let menu: Menu = codec
        .from_str(r#"{"Brew":{"Strength":2}}"#)
        .unwrap()
        .unwrap();

    let brew = menu.brew.unwrap();
    assert_eq!(brew.downcast_ref::<Coffee>(), Some(&Coffee { strength: 2 }));
}

#[test]
fn unmapped_marker_is_a_no_mapping_error() {
    let codec = codec(Config::default());
    let err = codec
        .from_str::<MysteryBox>(r#"{"Inner":{}}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::NoMapping { member: Some(_), .. }));
}

#[test]
fn mapping_to_an_unrelated_type_is_a_mismatch() {
    let config = Config::builder().map_member::<MysteryBox, Badge>("inner").build();
    let codec = codec(config);
    let err = codec
        .from_str::<MysteryBox>(r#"{"Inner":{}}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::TypeMismatch { .. }));
}

#[test]
fn unresolvable_members_do_not_break_serialization() {
    // The marker has no mapping, but serialization dispatches on the
    // runtime type and never needs one.
    let codec = codec(Config::default());
    let boxed = MysteryBox {
        inner: Some(Box::new(Coffee { strength: 1 })),
    };
    let json = codec.to_string(&boxed).unwrap();
    assert_eq!(json, r#"{"Inner":{"Strength":1}}"#);
}

#[test]
fn concrete_declared_type_can_be_overridden() {
    let config = Config::builder().map_type::<Widget, WidgetDerived>().build();
    let codec = codec(config);

    let boxed = codec
        .from_str_dyn::<Widget>(r#"{"Size":3,"Label":"big"}"#)
        .unwrap()
        .unwrap();
    let derived = boxed.take::<WidgetDerived>().ok().unwrap();
    assert_eq!(
        derived,
        WidgetDerived {
            size: 3,
            label: String::from("big"),
        }
    );
}

#[test]
fn polymorphic_member_serializes_its_runtime_type() {
    let codec = codec(Config::default());
    let menu = Menu {
        drink: Some(Box::new(Tea { sweet: false })),
        brew: None,
    };
    let json = codec.to_string(&menu).unwrap();
    assert_eq!(json, r#"{"Drink":{"Sweet":false}}"#);
}

#[test]
fn config_scalar_overrides_stand_in_for_registration() {
    // `Celsius` is never registered; the override alone carries it.
    let config = Config::builder()
        .scalar::<Celsius>(ScalarConverter::new(
            |value| {
                let celsius = value
                    .downcast_ref::<Celsius>()
                    .ok_or_else(|| CodecError::unexpected("a temperature", value.type_path()))?;
                Ok(serde_json::Value::from(celsius.0).to_string())
            },
            |node| {
                let degrees = node
                    .as_f64()
                    .ok_or_else(|| CodecError::unexpected("a number", "Celsius"))?;
                Ok(Box::new(Celsius(degrees)))
            },
            || Box::new(Celsius(0.0)),
        ))
        .build();
    let codec = codec(config);

    let json = codec.to_string(&Celsius(21.5)).unwrap();
    assert_eq!(json, "21.5");

    let back: Celsius = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, Celsius(21.5));
}

// -----------------------------------------------------------------------------
// Constructors

#[test]
fn members_inject_into_the_constructor() {
    let codec = codec(Config::default());
    let account: Account = codec
        .from_str(r#"{"Id":7,"Owner":"ada"}"#)
        .unwrap()
        .unwrap();
    assert_eq!(
        account,
        Account {
            id: 7,
            owner: String::from("ada"),
        }
    );
}

#[test]
fn parameter_binding_is_case_insensitive_and_defaults_fill_gaps() {
    // The ctor declares params "Id" and "OWNER"; members are "id"/"owner".
    let codec = codec(Config::default());
    let account: Account = codec.from_str(r#"{"Id":7}"#).unwrap().unwrap();
    assert_eq!(account.id, 7);
    assert_eq!(account.owner, "");
}

#[test]
fn injected_collections_are_never_reassigned() {
    // `items` binds to a constructor parameter and also has a setter;
    // only the injection may populate it.
    let codec = codec(Config::default());
    let basket: Basket = codec
        .from_str(r#"{"Items":["a","b"]}"#)
        .unwrap()
        .unwrap();
    assert_eq!(basket.items, vec![String::from("a"), String::from("b")]);
}

#[test]
fn undesignated_constructor_ambiguity_fails_on_read_only() {
    let codec = codec(Config::default());

    // Serialization never needs a constructor.
    let json = codec.to_string(&Fork { tines: 4 }).unwrap();
    assert_eq!(json, r#"{"Tines":4}"#);

    let err = codec.from_str::<Fork>(&json).unwrap_err();
    assert!(matches!(
        err,
        CodecError::AmbiguousConstructor {
            designated: false,
            ..
        }
    ));
}

#[test]
fn double_designation_fails_on_read_only() {
    let codec = codec(Config::default());

    let json = codec.to_string(&Knife { edges: 2 }).unwrap();
    assert_eq!(json, r#"{"Edges":2}"#);

    let err = codec.from_str::<Knife>(&json).unwrap_err();
    assert!(matches!(
        err,
        CodecError::AmbiguousConstructor {
            designated: true,
            ..
        }
    ));
}

// -----------------------------------------------------------------------------
// Encryption

fn ciphered(plaintext: &str) -> String {
    Base64Cipher.encrypt(plaintext)
}

#[test]
fn member_markers_encrypt_single_tokens() {
    let config = Config::builder().cipher(Base64Cipher).build();
    let codec = codec(config);
    let secrets = Secrets {
        password: String::from("abc"),
        armed: true,
    };

    let json = codec.to_string(&secrets).unwrap();
    let expected = format!(
        r#"{{"Password":"{}","Armed":"{}"}}"#,
        ciphered(r#""abc""#),
        ciphered("true"),
    );
    assert_eq!(json, expected);

    let back: Secrets = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, secrets);
}

#[test]
fn type_marker_encrypts_the_whole_object() {
    let config = Config::builder().cipher(Base64Cipher).build();
    let codec = codec(config);
    let grault = Grault {
        qux: String::from("abc"),
        garply: true,
    };

    let json = codec.to_string(&grault).unwrap();
    let expected = format!(r#""{}""#, ciphered(r#"{"Qux":"abc","Garply":true}"#));
    assert_eq!(json, expected);

    let back: Grault = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, grault);
}

#[test]
fn nested_markers_cipher_exactly_once() {
    // `Waldo.grault` carries a member marker and `Grault` a type marker;
    // the inner one must not double-wrap.
    let config = Config::builder().cipher(Base64Cipher).build();
    let codec = codec(config);
    let waldo = Waldo {
        grault: Some(Grault {
            qux: String::from("abc"),
            garply: false,
        }),
    };

    let json = codec.to_string(&waldo).unwrap();
    let expected = format!(
        r#"{{"Grault":"{}"}}"#,
        ciphered(r#"{"Qux":"abc","Garply":false}"#),
    );
    assert_eq!(json, expected);

    let back: Waldo = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, waldo);
}

#[test]
fn root_encryption_wraps_the_document() {
    let config = Config::builder()
        .cipher(Base64Cipher)
        .encrypt_root(true)
        .build();
    let codec = codec(config);
    let bar = Bar {
        baz: None,
        corge: 2.5,
    };

    let json = codec.to_string(&bar).unwrap();
    let expected = format!(r#""{}""#, ciphered(r#"{"Corge":2.5}"#));
    assert_eq!(json, expected);

    let back: Bar = codec.from_str(&json).unwrap().unwrap();
    assert_eq!(back, bar);
}

#[test]
fn markers_without_a_cipher_fail() {
    let codec = codec(Config::default());
    let secrets = Secrets::default();

    let err = codec.to_string(&secrets).unwrap_err();
    assert!(matches!(err, CodecError::NoCipher { .. }));

    let err = codec
        .from_str::<Secrets>(r#"{"Password":"x","Armed":"y"}"#)
        .unwrap_err();
    assert!(matches!(err, CodecError::NoCipher { .. }));
}

#[test]
fn bad_ciphertext_is_a_cipher_error() {
    let config = Config::builder().cipher(Base64Cipher).build();
    let codec = codec(config);
    let err = codec
        .from_str::<Grault>(r#""!!not-base64!!""#)
        .unwrap_err();
    assert!(matches!(err, CodecError::Cipher { .. }));
}

// -----------------------------------------------------------------------------
// Redaction

#[test]
fn redacted_members_keep_their_token_shape() {
    let codec = codec(Config::default());
    let badge = Badge {
        code: String::from("abc-123"),
        num: 99,
    };

    let json = codec.to_string(&badge).unwrap();
    assert_eq!(json, r#"{"Code":"XXX-111","Num":11}"#);
}

#[test]
fn redaction_can_be_disabled() {
    let config = Config::builder().redact_enabled(false).build();
    let codec = codec(config);
    let badge = Badge {
        code: String::from("abc-123"),
        num: 99,
    };

    let json = codec.to_string(&badge).unwrap();
    assert_eq!(json, r#"{"Code":"abc-123","Num":99}"#);
}

// -----------------------------------------------------------------------------
// Auto registration

#[cfg(feature = "auto_register")]
mod auto {
    use super::*;

    #[derive(Default)]
    struct Xyzzy;
    impl_facet!(Xyzzy);

    impl Describe for Xyzzy {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::structure::<Xyzzy>()
                .zero_arg(Xyzzy::default)
                .finish()
        }
    }

    crate::submit_descriptor!(Xyzzy);

    #[test]
    fn submitted_types_register_in_bulk() {
        let mut registry = DescriptorRegistry::empty();
        assert!(registry.auto_register());
        assert!(registry.contains(core::any::TypeId::of::<Xyzzy>()));
    }
}
