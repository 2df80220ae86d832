//! End-to-end scenarios: camelCase API payloads validated into records
//! and dumped back out, covering aliasing, validator ordering, defaults,
//! extras, unions, nesting and custom serializers.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use morph_core::{CalendarDate, ErrorKind, NamingTransform};
use morph_schema::{
    dump, dump_text, DumpMode, DumpOptions, EnumType, ExtraPolicy, FieldSpec, FieldType,
    ModelConfig, ModelInstance, ModelSpec, Stage, Value, ValueError, WhenUsed,
};
use serde_json::json;

fn camel() -> ModelConfig {
    ModelConfig::default().naming_transform(NamingTransform::Camel)
}

fn sophia() -> serde_json::Value {
    json!({
        "id": 3,
        "firstName": "Sophia",
        "lastName": "Brown",
        "maidenName": "",
        "age": "42",
        "email": "sophia.brown@x.dummyjson.com",
        "birthDate": "1982-11-6",
        "height": 177.72,
        "hair": {"color": "White", "type": "Wavy"},
        "address": {
            "address": "1642 Ninth Street",
            "city": "Washington",
            "coordinates": {"lat": 45.289366, "lng": 46.832664}
        }
    })
}

// ---------------------------------------------------------------------------
// Aliasing
// ---------------------------------------------------------------------------

#[test]
fn camel_payload_with_string_age() {
    let person = ModelSpec::builder("Person")
        .config(camel())
        .field(FieldSpec::new("first_name", FieldType::Str))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .field(FieldSpec::new("age", FieldType::Int))
        .build()
        .unwrap();

    let p = ModelInstance::validate_json_value(
        &person,
        &json!({"firstName": "Sophia", "lastName": "Brown", "age": "42"}),
    )
    .unwrap();
    assert_eq!(p.get("age"), Some(&Value::Int(42)));

    let by_name = dump(&p, DumpMode::Python, false).unwrap();
    let by_alias = dump(&p, DumpMode::Python, true).unwrap();
    assert_eq!(by_name.get("age"), Some(&Value::Int(42)));
    assert_eq!(by_alias.get("age"), Some(&Value::Int(42)));
    assert_eq!(by_name.get("first_name"), Some(&Value::from("Sophia")));
    assert_eq!(by_alias.get("firstName"), Some(&Value::from("Sophia")));

    assert_eq!(
        dump_text(&p, true).unwrap(),
        r#"{"firstName":"Sophia","lastName":"Brown","age":42}"#
    );
}

#[test]
fn populate_by_name_accepts_both_forms() {
    let spec = ModelSpec::builder("User")
        .config(camel().populate_by_name(true))
        .field(FieldSpec::new("user_id", FieldType::Int).alias("id"))
        .field(FieldSpec::new("first_name", FieldType::Str))
        .build()
        .unwrap();

    let a = spec.validate(&json!({"id": 1, "firstName": "A"}).into()).unwrap();
    let b = spec
        .validate(&json!({"user_id": 1, "first_name": "A"}).into())
        .unwrap();
    assert_eq!(a, b);
}

// ---------------------------------------------------------------------------
// Validator pipeline
// ---------------------------------------------------------------------------

type Log = Arc<Mutex<Vec<&'static str>>>;

fn record(
    log: &Log,
    name: &'static str,
) -> impl Fn(Value) -> Result<Value, ValueError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |v| {
        log.lock().unwrap().push(name);
        Ok(v)
    }
}

#[test]
fn after_validators_run_in_reverse_declaration_order() {
    let log: Log = Arc::default();
    let spec = ModelSpec::builder("User")
        .field(FieldSpec::new("last_name", FieldType::Str))
        .after("last_name", "a", record(&log, "a"))
        .after("last_name", "b", record(&log, "b"))
        .after("last_name", "c", record(&log, "c"))
        .build()
        .unwrap();

    spec.validate(&json!({"last_name": "Brown"}).into()).unwrap();
    assert_eq!(*log.lock().unwrap(), ["c", "b", "a"]);
}

#[test]
fn before_chain_completes_before_after_chain() {
    let log: Log = Arc::default();
    let spec = ModelSpec::builder("User")
        .field(FieldSpec::new("age", FieldType::Int))
        .after("age", "after_1", record(&log, "after_1"))
        .before("age", "before_1", record(&log, "before_1"))
        .after("age", "after_2", record(&log, "after_2"))
        .before("age", "before_2", record(&log, "before_2"))
        .build()
        .unwrap();

    spec.validate(&json!({"age": "42"}).into()).unwrap();
    assert_eq!(
        *log.lock().unwrap(),
        ["before_2", "before_1", "after_2", "after_1"]
    );
}

#[test]
fn failure_stops_field_but_not_other_fields() {
    let log: Log = Arc::default();
    let spec = ModelSpec::builder("User")
        .field(FieldSpec::new("last_name", FieldType::Str))
        .field(FieldSpec::new("first_name", FieldType::Str))
        .after("last_name", "a", record(&log, "a"))
        .after("last_name", "b", |_| Err(ValueError::new("rejected")))
        .after("last_name", "c", record(&log, "c"))
        .after("first_name", "other", record(&log, "other"))
        .build()
        .unwrap();

    let err = spec
        .validate(&json!({"last_name": "Brown", "first_name": "Sophia"}).into())
        .unwrap_err();
    assert_eq!(*log.lock().unwrap(), ["c", "other"]);
    assert!(err.has("last_name", ErrorKind::Validator));
    assert_eq!(err.len(), 1);
    assert_eq!(err.errors()[0].message, "b: rejected");
}

fn last_name_rules() -> Arc<ModelSpec> {
    let text = |v: &Value| v.as_str().map(str::to_string);
    ModelSpec::builder("User")
        .config(camel().populate_by_name(true).strip_whitespace(true))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .after("last_name", "min_length", move |v| match text(&v) {
            Some(s) if s.chars().count() < 3 => Err(ValueError::new("must be at least 3 characters")),
            _ => Ok(v),
        })
        .after("last_name", "capitalized", move |v| match text(&v) {
            Some(s) if s.chars().next().is_some_and(char::is_lowercase) => {
                Err(ValueError::new("must start with an uppercase letter"))
            }
            _ => Ok(v),
        })
        .after("last_name", "not_c", move |v| match text(&v) {
            Some(s) if s.to_lowercase().starts_with('c') => {
                Err(ValueError::new("must not start with c"))
            }
            Some(s) => Ok(Value::Str(s.to_uppercase())),
            None => Ok(v),
        })
        .before("last_name", "raw_min_length", move |v| match text(&v) {
            Some(s) if s.chars().count() < 3 => Err(ValueError::new("must be at least 3 characters")),
            _ => Ok(v),
        })
        .build()
        .unwrap()
}

#[test]
fn last_name_rules_transform_and_reject() {
    let spec = last_name_rules();
    let u = spec.validate(&json!({"lastName": " Brown "}).into()).unwrap();
    assert_eq!(u.get("last_name"), Some(&Value::from("BROWN")));

    // "not_c" runs first and rejects before the capitalization check.
    let err = spec.validate(&json!({"lastName": "carter"}).into()).unwrap_err();
    assert_eq!(err.errors()[0].message, "not_c: must not start with c");

    let err = spec.validate(&json!({"lastName": "Li"}).into()).unwrap_err();
    assert_eq!(err.errors()[0].message, "raw_min_length: must be at least 3 characters");
    assert_eq!(err.errors()[0].kind, ErrorKind::Validator);
}

#[test]
fn one_validator_targets_several_fields() {
    let spec = ModelSpec::builder("User")
        .field(FieldSpec::new("first_name", FieldType::Str))
        .field(FieldSpec::new("last_name", FieldType::Str))
        .validator(&["first_name", "last_name"], Stage::After, "title_case", |v| {
            Ok(match v.as_str() {
                Some(s) => {
                    let mut chars = s.chars();
                    let titled: String = chars
                        .next()
                        .map(|c| c.to_uppercase().chain(chars).collect())
                        .unwrap_or_default();
                    Value::Str(titled)
                }
                None => v,
            })
        })
        .build()
        .unwrap();
    let u = spec
        .validate(&json!({"first_name": "sophia", "last_name": "brown"}).into())
        .unwrap();
    assert_eq!(u.get("first_name"), Some(&Value::from("Sophia")));
    assert_eq!(u.get("last_name"), Some(&Value::from("Brown")));
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn account() -> Arc<ModelSpec> {
    ModelSpec::builder("Account")
        .config(camel().extra(ExtraPolicy::Allow).validate_defaults(true))
        .field(
            FieldSpec::new("user_id", FieldType::uuid4())
                .alias("id")
                .default_factory(|| Value::Uuid(uuid::Uuid::new_v4())),
        )
        .field(FieldSpec::new("email", FieldType::Str))
        .build()
        .unwrap()
}

#[test]
fn missing_required_field_is_reported() {
    let err = account().validate(&json!({}).into()).unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has("email", ErrorKind::MissingRequiredField));
}

#[test]
fn default_factory_runs_per_construction() {
    let spec = account();
    let ids: HashSet<String> = (0..16)
        .map(|_| {
            let a = spec.validate(&json!({"email": "a@b.c"}).into()).unwrap();
            assert!(!a.is_set("user_id"));
            a.get("user_id").unwrap().as_uuid().unwrap().to_string()
        })
        .collect();
    assert_eq!(ids.len(), 16);
}

#[test]
fn static_default_is_not_shared() {
    let spec = ModelSpec::builder("M")
        .config(ModelConfig::default().validate_on_assignment(true))
        .field(FieldSpec::new("tags", FieldType::list(FieldType::Str)).default(Vec::<Value>::new()))
        .build()
        .unwrap();
    let mut a = spec.validate(&json!({}).into()).unwrap();
    let b = spec.validate(&json!({}).into()).unwrap();
    a.set("tags", Value::List(vec![Value::from("x")])).unwrap();
    assert_eq!(b.get("tags"), Some(&Value::List(vec![])));
}

// ---------------------------------------------------------------------------
// Extras
// ---------------------------------------------------------------------------

fn extras_model(policy: ExtraPolicy) -> Arc<ModelSpec> {
    ModelSpec::builder("User")
        .config(ModelConfig::default().extra(policy))
        .field(FieldSpec::new("name", FieldType::Str))
        .build()
        .unwrap()
}

#[test]
fn forbid_reports_unknown_key() {
    let err = extras_model(ExtraPolicy::Forbid)
        .validate(&json!({"name": "x", "bogus": 1}).into())
        .unwrap_err();
    assert_eq!(err.len(), 1);
    assert!(err.has("bogus", ErrorKind::UnknownField));
}

#[test]
fn ignore_drops_from_both_dumps() {
    let m = extras_model(ExtraPolicy::Ignore)
        .validate(&json!({"name": "x", "bogus": 1}).into())
        .unwrap();
    assert!(m.extras().is_empty());
    assert_eq!(dump(&m, DumpMode::Python, false).unwrap().get("bogus"), None);
    assert_eq!(dump_text(&m, true).unwrap(), r#"{"name":"x"}"#);
}

#[test]
fn allow_surfaces_in_both_dumps() {
    let m = extras_model(ExtraPolicy::Allow)
        .validate(&json!({"name": "x", "bogus": 1}).into())
        .unwrap();
    assert_eq!(m.extra("bogus"), Some(&Value::Int(1)));
    assert_eq!(
        dump(&m, DumpMode::Python, true).unwrap().get("bogus"),
        Some(&Value::Int(1))
    );
    assert_eq!(dump_text(&m, false).unwrap(), r#"{"name":"x","bogus":1}"#);
}

#[test]
fn extras_from_full_payload() {
    let mut payload = sophia();
    // 3 is not a UUID.
    let err = account().validate(&payload.clone().into()).unwrap_err();
    assert!(err.has("user_id", ErrorKind::TypeCoercion));

    payload.as_object_mut().unwrap().remove("id");
    let m = account().validate(&payload.into()).unwrap();
    assert_eq!(m.get("email"), Some(&Value::from("sophia.brown@x.dummyjson.com")));
    assert_eq!(m.extra("firstName"), Some(&Value::from("Sophia")));
    assert_eq!(m.extras().len(), 8);
}

// ---------------------------------------------------------------------------
// Unions
// ---------------------------------------------------------------------------

fn union_model(members: Vec<FieldType>) -> Arc<ModelSpec> {
    ModelSpec::builder("User")
        .field(FieldSpec::new("user_id", FieldType::union(members)).alias("id"))
        .build()
        .unwrap()
}

#[test]
fn union_declaration_order_decides() {
    let text = "8f14e45f-ceea-467f-a0e6-0d8a3b1f7c2e";
    let str_first = union_model(vec![FieldType::Int, FieldType::Str, FieldType::uuid4()]);
    let u = str_first.validate(&json!({"id": text}).into()).unwrap();
    assert_eq!(u.get("user_id"), Some(&Value::from(text)));

    let uuid_first = union_model(vec![FieldType::Int, FieldType::uuid4(), FieldType::Str]);
    let u = uuid_first.validate(&json!({"id": text}).into()).unwrap();
    assert!(matches!(u.get("user_id"), Some(Value::Uuid(_))));

    // Text dumps agree on the rendering either way.
    assert_eq!(dump_text(&u, true).unwrap(), format!(r#"{{"id":"{text}"}}"#));

    let u = uuid_first.validate(&json!({"id": 3}).into()).unwrap();
    assert_eq!(u.get("user_id"), Some(&Value::Int(3)));
}

#[test]
fn union_failure_lists_every_member() {
    let spec = union_model(vec![FieldType::Int, FieldType::uuid4()]);
    let err = spec.validate(&json!({"id": true}).into()).unwrap_err();
    let e = &err.errors()[0];
    assert_eq!(e.kind, ErrorKind::TypeCoercion);
    assert!(e.message.contains("int:"), "{}", e.message);
    assert!(e.message.contains("uuid4:"), "{}", e.message);
}

// ---------------------------------------------------------------------------
// Serializer
// ---------------------------------------------------------------------------

fn product() -> Arc<ModelSpec> {
    ModelSpec::builder("Product")
        .config(camel().populate_by_name(true))
        .field(FieldSpec::new("name", FieldType::Str))
        .field(FieldSpec::new(
            "category",
            FieldType::enumeration(EnumType::new(
                "ProductType",
                [
                    ("SOFTWARE", "software"),
                    ("ACCESSORIES", "accessories"),
                    ("HARDWARE", "hardware"),
                    ("COURSES", "courses"),
                ],
            )),
        ))
        .field(
            FieldSpec::new("manufactured_date", FieldType::Date.nullable())
                .input_alias("completionDate"),
        )
        .field(
            FieldSpec::new("base_msrp_usd", FieldType::Float)
                .input_alias("msrpUSD")
                .output_alias("baseMSRPUSD"),
        )
        .field(
            FieldSpec::new("number_of_components", FieldType::Int)
                .input_alias("doors")
                .default(4),
        )
        .serializer(
            "manufactured_date",
            "slash_date",
            WhenUsed::JsonUnlessNone,
            |v| match v.as_date() {
                Some(d) => Ok(Value::Str(d.format("%Y/%m/%d"))),
                None => Err(ValueError::new("expected a date")),
            },
        )
        .build()
        .unwrap()
}

#[test]
fn date_serializer_applies_in_text_mode_only() {
    let p = product()
        .validate_json(
            r#"{"name": "Laptop", "category": "hardware", "completionDate": "2023-01-01",
                "msrpUSD": 1299.99, "doors": "2"}"#,
        )
        .unwrap();

    let structural = dump(&p, DumpMode::Python, false).unwrap();
    assert_eq!(
        structural.get("manufactured_date"),
        Some(&Value::Date(CalendarDate::from_ymd(2023, 1, 1).unwrap()))
    );
    assert_eq!(structural.get("number_of_components"), Some(&Value::Int(2)));

    let text = dump_text(&p, true).unwrap();
    assert_eq!(
        text,
        r#"{"name":"Laptop","category":"hardware","manufacturedDate":"2023/01/01","baseMSRPUSD":1299.99,"numberOfComponents":2}"#
    );
}

#[test]
fn date_serializer_skips_null() {
    let p = product()
        .validate(
            &json!({"name": "Course", "category": "courses", "completionDate": null, "msrpUSD": 10})
                .into(),
        )
        .unwrap();
    let text = dump_text(&p, false).unwrap();
    assert!(text.contains(r#""manufactured_date":null"#), "{text}");
    assert!(text.contains(r#""base_msrp_usd":10.0"#), "{text}");
}

#[test]
fn bad_enum_value_lists_members() {
    let err = product()
        .validate(&json!({"name": "X", "category": "toys", "completionDate": null, "msrpUSD": 1}).into())
        .unwrap_err();
    let e = err.for_field("category").next().unwrap();
    assert_eq!(
        e.message,
        "input should be 'software', 'accessories', 'hardware' or 'courses': got 'toys'"
    );
}

// ---------------------------------------------------------------------------
// Nesting
// ---------------------------------------------------------------------------

fn profile() -> Arc<ModelSpec> {
    let coordinates = ModelSpec::builder("Coordinates")
        .field(FieldSpec::new("lat", FieldType::Float))
        .field(FieldSpec::new("lng", FieldType::Float))
        .build()
        .unwrap();
    let address = ModelSpec::builder("Address")
        .config(camel())
        .field(FieldSpec::new("address", FieldType::Str))
        .field(FieldSpec::new("city", FieldType::Str))
        .field(FieldSpec::new("coordinates", FieldType::model(&coordinates)))
        .build()
        .unwrap();
    ModelSpec::builder("Profile")
        .config(camel())
        .field(FieldSpec::new("first_name", FieldType::Str))
        .field(FieldSpec::new("address", FieldType::model(&address)))
        .field(FieldSpec::new("hair", FieldType::Dict))
        .field(FieldSpec::new("date_of_birth", FieldType::Date.nullable()).alias("birthDate"))
        .build()
        .unwrap()
}

#[test]
fn nested_models_validate_and_dump_recursively() {
    let p = profile().validate(&sophia().into()).unwrap();
    let address = p.get("address").and_then(Value::as_model).unwrap();
    assert_eq!(address.get("city"), Some(&Value::from("Washington")));
    assert_eq!(
        p.get("date_of_birth").and_then(Value::as_date).map(CalendarDate::to_iso8601),
        Some("1982-11-06".to_string())
    );

    let out = p.dump(&DumpOptions::json().by_alias(true)).unwrap().to_json().unwrap();
    assert_eq!(out["address"]["coordinates"]["lat"], json!(45.289366));
    assert_eq!(out["hair"], json!({"color": "White", "type": "Wavy"}));
    assert_eq!(out["birthDate"], json!("1982-11-06"));
}

#[test]
fn nested_errors_carry_paths() {
    let mut payload = sophia();
    payload["address"]["coordinates"]["lat"] = json!("north");
    payload["address"]["city"] = json!(null);
    let err = profile().validate(&payload.into()).unwrap_err();
    let locs: Vec<String> = err.errors().iter().map(|e| e.loc.to_string()).collect();
    assert_eq!(locs, ["address.city", "address.coordinates.lat"]);
    assert!(err.has("address", ErrorKind::TypeCoercion));
}

#[test]
fn nested_non_mapping_is_located_at_field() {
    let mut payload = sophia();
    payload["address"] = json!("somewhere");
    let err = profile().validate(&payload.into()).unwrap_err();
    assert_eq!(err.len(), 1);
    assert_eq!(err.errors()[0].loc.to_string(), "address");
}

#[test]
fn aggregated_report_renders() {
    let err = profile()
        .validate(&json!({"address": {"address": "x", "city": "y", "coordinates": {"lat": 1, "lng": 2}}}).into())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "3 validation errors for Profile\n  \
         first_name: field required [missing]\n  \
         hair: field required [missing]\n  \
         date_of_birth: field required [missing]"
    );
}
