use mirror_rs::{
    fuzzy_field, fuzzy_method,
    resolve::corlib,
    typed_fuzzy_field, typed_fuzzy_field_of, typed_fuzzy_method, typed_fuzzy_method_of,
    types::members::{FieldDefinition, MemberInfo, MethodDefinition},
    AccessError, FieldAccessor, MemberCatalog, Memoized, MethodInvoker, MirrorError, ObjectRef,
    RegistryBuilder, RuntimeType, TypeDefinition, TypeDescription, TypeRegistry, Value,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Barrier,
};

fn this_field(this: Option<&Value>, name: &str) -> Result<Value, mirror_rs::error::BoxError> {
    let object = this.and_then(Value::as_object).ok_or("receiver is not an object")?;
    Ok(object.field(name)?)
}

fn build_fixture() -> Result<&'static TypeRegistry, MirrorError> {
    let list_of = |t: RuntimeType| RuntimeType::generic(corlib::LIST, [t]);
    RegistryBuilder::new()
        .define(
            TypeDefinition::interface("app.Named")
                .method(MethodDefinition::new("name", RuntimeType::String)),
        )
        .define(
            TypeDefinition::class("app.Person")
                .implements(RuntimeType::named("app.Named"))
                .field(FieldDefinition::new("name", RuntimeType::String))
                .field(FieldDefinition::new("title", RuntimeType::String))
                .field(FieldDefinition::new("age", RuntimeType::Int32).private())
                .field(FieldDefinition::new("population", RuntimeType::Int64).with_static())
                .field(FieldDefinition::new("initials", list_of(RuntimeType::Char)))
                .field(FieldDefinition::new("aliases", list_of(RuntimeType::String)))
                .field(FieldDefinition::new("partner", RuntimeType::named("app.Named")))
                .method(
                    MethodDefinition::new("name", RuntimeType::String)
                        .with_virtual()
                        .body(|this, _| this_field(this, "name")),
                )
                .method(
                    MethodDefinition::new("greet", RuntimeType::String)
                        .params([RuntimeType::String])
                        .body(|this, args| {
                            Ok(Value::from(format!("{}, {}", args[0], this_field(this, "name")?)))
                        }),
                )
                .method(
                    MethodDefinition::new("twice", RuntimeType::Int32)
                        .params([RuntimeType::Int32])
                        .with_static()
                        .body(|_, args| match args[0] {
                            Value::Int32(i) => Ok(Value::Int32(i * 2)),
                            _ => Err("not an Int32".into()),
                        }),
                )
                .method(
                    MethodDefinition::new("mystery", RuntimeType::Object)
                        .body(|_, _| Ok(Value::Int32(7))),
                )
                .method(
                    MethodDefinition::new("nickname", RuntimeType::String)
                        .params([RuntimeType::Int32])
                        .body(|_, _| Ok(Value::Null)),
                )
                .method(
                    MethodDefinition::new("explode", RuntimeType::Void)
                        .body(|_, _| Err("boom".into())),
                ),
        )
        .define(TypeDefinition::class("app.Anonymous").implements(RuntimeType::named("app.Named")))
        .define(
            TypeDefinition::class("app.Container")
                .method(
                    MethodDefinition::new("get", RuntimeType::Object).body(|_, _| Ok(Value::Null)),
                )
                .method(
                    MethodDefinition::new("get", RuntimeType::String)
                        .body(|_, _| Ok(Value::from("contents"))),
                )
                .method(
                    MethodDefinition::new("owner", RuntimeType::named("app.Person"))
                        .body(|_, _| Ok(Value::Null)),
                ),
        )
        .define(
            TypeDefinition::class("app.Tally")
                .method(
                    MethodDefinition::new("get", RuntimeType::Object).body(|_, _| Ok(Value::Null)),
                )
                .method(
                    MethodDefinition::new("size", RuntimeType::Int32)
                        .body(|_, _| Ok(Value::Int32(0))),
                ),
        )
        .define(
            TypeDefinition::class("app.Pair")
                .method(
                    MethodDefinition::new("first", RuntimeType::String)
                        .body(|_, _| Ok(Value::from("a"))),
                )
                .method(
                    MethodDefinition::new("second", RuntimeType::String)
                        .body(|_, _| Ok(Value::from("b"))),
                )
                .method(
                    MethodDefinition::new("clear", RuntimeType::Void)
                        .body(|_, _| Ok(Value::Int32(1))),
                ),
        )
        .build()
}

static FIXTURE: Memoized<&'static TypeRegistry, MirrorError> = Memoized::new(build_fixture);

fn registry() -> &'static TypeRegistry {
    FIXTURE.get().copied().expect("fixture registry should build")
}

fn class(name: &str) -> TypeDescription {
    registry().get_class(name).unwrap()
}

fn person(name: &str) -> Value {
    let person = registry().new_object(&RuntimeType::named("app.Person")).unwrap();
    person.set_field("name", name).unwrap();
    person.set_field("title", "Dr.").unwrap();
    Value::Object(person)
}

#[test]
fn unique_field_ignores_names() {
    let age = fuzzy_field(class("app.Person"), RuntimeType::Int32).find().unwrap();
    assert_eq!(age.description().name(), "age");

    let named = fuzzy_field(class("app.Person"), RuntimeType::Int32)
        .names(["unrelated"])
        .find()
        .unwrap();
    assert_eq!(named, age);
}

#[test]
fn same_typed_fields_are_ambiguous_without_names() {
    let err = fuzzy_field(class("app.Person"), RuntimeType::String)
        .find()
        .unwrap_err();
    match &err {
        MirrorError::Ambiguous { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
            assert!(candidates[0].contains("::name"));
            assert!(candidates[1].contains("::title"));
        }
        other => panic!("expected Ambiguous, got {:?}", other),
    }
    assert!(err.is_retryable_with_names());

    let title = fuzzy_field(class("app.Person"), RuntimeType::String)
        .names(["title"])
        .find()
        .unwrap();
    assert_eq!(title.description().name(), "title");
    assert_eq!(title.get(Some(&person("Ada"))).unwrap(), Value::from("Dr."));
}

#[test]
fn unmatched_names_are_not_retryable() {
    let err = fuzzy_field(class("app.Person"), RuntimeType::String)
        .names(["heading", "label"])
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::NoNameMatch { ref names, .. } if names.len() == 2));
    assert!(!err.is_retryable_with_names());
}

#[test]
fn missing_fields_are_not_found() {
    let err = fuzzy_field(class("app.Person"), RuntimeType::Float64)
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));
    assert!(err.to_string().contains("Float64"));
}

#[test]
fn names_break_method_ties_in_catalog_order() {
    let pair = class("app.Pair");
    let second = fuzzy_method(pair, RuntimeType::String)
        .names(["second"])
        .find()
        .unwrap();
    assert_eq!(second.description().name(), "second");

    // candidates are walked outermost, so declaration order decides
    let either = fuzzy_method(pair, RuntimeType::String)
        .names(["second", "first"])
        .find()
        .unwrap();
    assert_eq!(either.description().name(), "first");
}

#[test]
fn covariant_get_resolves_through_exact_tier() {
    let container = class("app.Container");
    let get = fuzzy_method(container, RuntimeType::String).find().unwrap();
    assert_eq!(get.description().method.return_type, RuntimeType::String);
    let receiver = Value::Object(registry().new_object(&container.runtime_type()).unwrap());
    assert_eq!(get.invoke(Some(&receiver), &[]).unwrap(), Value::from("contents"));
}

#[test]
fn tiers_merge_before_name_selection() {
    let container = class("app.Container");
    let err = fuzzy_method(container, RuntimeType::Object).find().unwrap_err();
    match err {
        MirrorError::Ambiguous { candidates, .. } => assert_eq!(candidates.len(), 3),
        other => panic!("expected Ambiguous, got {:?}", other),
    }

    let get = fuzzy_method(container, RuntimeType::Object)
        .names(["get"])
        .find()
        .unwrap();
    assert_eq!(get.description().method.return_type, RuntimeType::Object);
}

#[test]
fn merged_tiers_report_unmatched_names() {
    let err = fuzzy_method(class("app.Container"), RuntimeType::Object)
        .names(["third", "fourth"])
        .find()
        .unwrap_err();
    match &err {
        MirrorError::NoNameMatch { candidates, names, .. } => {
            assert_eq!(candidates.len(), 3);
            assert_eq!(names, &["third", "fourth"]);
        }
        other => panic!("expected NoNameMatch, got {:?}", other),
    }
    assert!(!err.is_retryable_with_names());
}

#[test]
fn primitive_returns_do_not_widen_to_object() {
    let tally = class("app.Tally");
    let get = fuzzy_method(tally, RuntimeType::Object).find().unwrap();
    assert_eq!(get.description().name(), "get");

    let size = fuzzy_method(tally, RuntimeType::Int32).find().unwrap();
    assert_eq!(size.description().name(), "size");
}

#[test]
fn lone_assignable_method_resolves_without_names() {
    let owner = fuzzy_method(class("app.Container"), RuntimeType::named("app.Named"))
        .find()
        .unwrap();
    assert_eq!(owner.description().name(), "owner");
}

#[test]
fn parameters_are_exact_and_default_to_none() {
    let person_class = class("app.Person");
    let greet = fuzzy_method(person_class, RuntimeType::String)
        .params([RuntimeType::String])
        .find()
        .unwrap();
    assert_eq!(greet.description().name(), "greet");
    assert_eq!(
        greet
            .invoke(Some(&person("Ada")), &[Value::from("Hello")])
            .unwrap(),
        Value::from("Hello, Ada")
    );

    let err = fuzzy_method(person_class, RuntimeType::String)
        .params([RuntimeType::Object])
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));

    // no params means exactly zero parameters, not "any"
    let name = fuzzy_method(person_class, RuntimeType::String).find().unwrap();
    assert_eq!(name.description().name(), "name");
}

#[test]
fn object_methods_are_never_candidates() {
    let err = fuzzy_method(class("app.Pair"), RuntimeType::Int32)
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::NotFound { .. }));
}

#[test]
fn setting_params_twice_is_a_usage_error() {
    let err = fuzzy_method(class("app.Person"), RuntimeType::String)
        .params(Vec::new())
        .params([RuntimeType::String])
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::InvalidUsage(_)));
}

#[test]
fn bare_type_parameters_are_rejected() {
    let list = class(corlib::LIST);
    let err = fuzzy_field(list, RuntimeType::parameter(0)).find().unwrap_err();
    assert!(matches!(err, MirrorError::InvalidUsage(_)));
    let err = fuzzy_method(list, RuntimeType::parameter(0))
        .params([RuntimeType::Int32])
        .find()
        .unwrap_err();
    assert!(matches!(err, MirrorError::InvalidUsage(_)));
}

#[test]
fn generic_arguments_take_part_in_field_matching() {
    let person_class = class("app.Person");
    let list_of = |t: RuntimeType| RuntimeType::generic(corlib::LIST, [t]);

    let initials = fuzzy_field(person_class, list_of(RuntimeType::Char)).find().unwrap();
    assert_eq!(initials.description().name(), "initials");
    let aliases = fuzzy_field(person_class, list_of(RuntimeType::String)).find().unwrap();
    assert_eq!(aliases.description().name(), "aliases");

    let raw = RuntimeType::named(corlib::LIST);
    assert!(matches!(
        fuzzy_field(person_class, raw.clone()).find(),
        Err(MirrorError::NotFound { .. })
    ));
    assert!(matches!(
        fuzzy_field(person_class, raw.clone()).erased().find(),
        Err(MirrorError::Ambiguous { .. })
    ));
    let erased = fuzzy_field(person_class, raw)
        .erased()
        .names(["aliases"])
        .find()
        .unwrap();
    assert_eq!(erased, aliases);
}

#[test]
fn generic_lists_round_trip_through_resolved_handles() {
    let list_class = class(corlib::LIST);
    let letters = corlib::new_list(
        registry(),
        RuntimeType::Char,
        vec![Value::Char('a'), Value::Char('b')],
    )
    .unwrap();
    let letters = Value::Object(letters);

    let initials = fuzzy_field(
        class("app.Person"),
        RuntimeType::generic(corlib::LIST, [RuntimeType::Char]),
    )
    .find()
    .unwrap();
    let ada = person("Ada");
    initials.set(Some(&ada), letters.clone()).unwrap();

    let size = typed_fuzzy_method::<i32>(list_class).find().unwrap();
    let stored = initials.require(Some(&ada)).unwrap();
    assert_eq!(size.require(Some(&stored), &[]).unwrap(), 2);

    let get = fuzzy_method(list_class, RuntimeType::Object)
        .params([RuntimeType::Int32])
        .find()
        .unwrap();
    assert_eq!(get.invoke(Some(&letters), &[Value::Int32(1)]).unwrap(), Value::Char('b'));

    let err = get.invoke(Some(&letters), &[Value::Int32(5)]).unwrap_err();
    assert!(matches!(err, MirrorError::InvocationFailure { .. }));
    assert!(err.to_string().contains("out of bounds"));
}

#[test]
fn typed_field_mismatch_surfaces_on_get() {
    let ada = person("Ada");
    let partner =
        typed_fuzzy_field_of::<ObjectRef>(class("app.Person"), RuntimeType::named("app.Named"))
            .find()
            .unwrap();
    assert_eq!(partner.get(Some(&ada)).unwrap(), None);

    // raw writes skip the store check, so the field can hold a foreign object
    let stranger = registry().new_object(&RuntimeType::Object).unwrap();
    ada.as_object().unwrap().set_field("partner", stranger).unwrap();
    let err = partner.get(Some(&ada)).unwrap_err();
    assert!(matches!(err, MirrorError::TypeMismatch { .. }));

    let grace = person("Grace");
    ada.as_object()
        .unwrap()
        .set_field("partner", grace.clone())
        .unwrap();
    assert_eq!(partner.require(Some(&ada)).unwrap(), *grace.as_object().unwrap());
}

#[test]
fn typed_method_mismatch_surfaces_on_invoke() {
    let mystery = fuzzy_method(class("app.Person"), RuntimeType::Object)
        .names(["mystery"])
        .find()
        .unwrap()
        .description();
    let typed = MethodInvoker::typed::<String>(mystery, RuntimeType::String);
    let err = typed.invoke(Some(&person("Ada")), &[]).unwrap_err();
    assert!(matches!(err, MirrorError::TypeMismatch { .. }));

    let untyped = MethodInvoker::new(mystery);
    assert_eq!(untyped.invoke(Some(&person("Ada")), &[]).unwrap(), Value::Int32(7));
}

#[test]
fn typed_handles_convert_results() {
    let ada = person("Ada");
    let name = typed_fuzzy_field::<String>(class("app.Person"))
        .names(["name"])
        .find()
        .unwrap();
    assert_eq!(name.require(Some(&ada)).unwrap(), "Ada");
    name.set(Some(&ada), "Ada Lovelace".to_string()).unwrap();

    let greet = typed_fuzzy_method_of::<String>(class("app.Person"), RuntimeType::String)
        .params([RuntimeType::String])
        .find()
        .unwrap();
    assert_eq!(
        greet.require(Some(&ada), &[Value::from("Hi")]).unwrap(),
        "Hi, Ada Lovelace"
    );

    let nickname = typed_fuzzy_method::<String>(class("app.Person"))
        .params([RuntimeType::Int32])
        .find()
        .unwrap();
    assert_eq!(nickname.invoke(Some(&ada), &[Value::Int32(0)]).unwrap(), None);
    assert!(matches!(
        nickname.require(Some(&ada), &[Value::Int32(0)]),
        Err(MirrorError::UnexpectedNull { .. })
    ));
}

#[test]
fn instance_members_need_an_instance() {
    let name = fuzzy_field(class("app.Person"), RuntimeType::String)
        .names(["name"])
        .find()
        .unwrap();
    assert!(matches!(name.get(None), Err(MirrorError::MissingInstance { .. })));
    assert!(matches!(
        name.get(Some(&Value::Null)),
        Err(MirrorError::MissingInstance { .. })
    ));
    assert!(matches!(
        name.set(None, "x"),
        Err(MirrorError::MissingInstance { .. })
    ));

    let greet = fuzzy_method(class("app.Person"), RuntimeType::String)
        .params([RuntimeType::String])
        .find()
        .unwrap();
    assert!(matches!(
        greet.invoke(None, &[Value::from("Hi")]),
        Err(MirrorError::MissingInstance { .. })
    ));
}

#[test]
fn static_members_ignore_the_instance() {
    let person_class = class("app.Person");
    let population = person_class
        .fields()
        .find(|f| f.name() == "population")
        .map(FieldAccessor::new)
        .unwrap();
    population.set(None, 3i64).unwrap();
    assert_eq!(population.get(Some(&person("Ada"))).unwrap(), Value::Int64(3));

    let twice = fuzzy_method(person_class, RuntimeType::Int32)
        .params([RuntimeType::Int32])
        .find()
        .unwrap();
    assert_eq!(twice.invoke(None, &[Value::Int32(21)]).unwrap(), Value::Int32(42));
}

#[test]
fn low_level_failures_are_wrapped() {
    let name = fuzzy_field(class("app.Person"), RuntimeType::String)
        .names(["name"])
        .find()
        .unwrap();

    let err = name.get(Some(&Value::from("not a person"))).unwrap_err();
    assert!(matches!(
        err.cause().and_then(|c| c.downcast_ref::<AccessError>()),
        Some(AccessError::NotAnInstance { .. })
    ));

    let err = name.set(Some(&person("Ada")), 5).unwrap_err();
    assert!(matches!(
        err.cause().and_then(|c| c.downcast_ref::<AccessError>()),
        Some(AccessError::IncompatibleValue { .. })
    ));

    let explode = fuzzy_method(class("app.Person"), RuntimeType::Void).find().unwrap();
    let err = explode.invoke(Some(&person("Ada")), &[]).unwrap_err();
    assert!(matches!(err, MirrorError::InvocationFailure { .. }));
    assert_eq!(err.cause().map(|c| c.to_string()), Some("boom".to_string()));

    let greet = fuzzy_method(class("app.Person"), RuntimeType::String)
        .params([RuntimeType::String])
        .find()
        .unwrap();
    let err = greet.invoke(Some(&person("Ada")), &[]).unwrap_err();
    assert!(matches!(
        err.cause().and_then(|c| c.downcast_ref::<AccessError>()),
        Some(AccessError::ArgumentCount { expected: 1, actual: 0 })
    ));
}

#[test]
fn interface_methods_dispatch_on_the_receiver() {
    let name = fuzzy_method(class("app.Named"), RuntimeType::String).find().unwrap();
    assert_eq!(name.description().parent.type_name(), "app.Named");
    assert_eq!(name.invoke(Some(&person("Ada")), &[]).unwrap(), Value::from("Ada"));

    let anonymous = Value::Object(
        registry()
            .new_object(&RuntimeType::named("app.Anonymous"))
            .unwrap(),
    );
    let err = name.invoke(Some(&anonymous), &[]).unwrap_err();
    assert!(matches!(
        err.cause().and_then(|c| c.downcast_ref::<AccessError>()),
        Some(AccessError::AbstractMethod(_))
    ));
}

#[test]
fn type_lookups_try_names_in_order() {
    let registry = registry();
    assert_eq!(registry.get_class("app.Person").unwrap().type_name(), "app.Person");
    assert!(registry.maybe_get_class("app.Human").is_none());

    let found = registry.find_class(["app.Human", "app.Person", "app.Named"]).unwrap();
    assert_eq!(found.type_name(), "app.Person");

    match registry.find_class(["app.Human", "app.Being"]) {
        Err(MirrorError::TypeNotFound { names }) => {
            assert_eq!(names, vec!["app.Human", "app.Being"])
        }
        other => panic!("expected TypeNotFound, got {:?}", other),
    }
    assert!(registry.maybe_find_class(["app.Human"]).is_none());
    assert!(matches!(
        registry.get_class("app.Human"),
        Err(MirrorError::TypeNotFound { .. })
    ));
}

#[test]
fn memoized_values_compute_once_under_contention() {
    const THREADS: usize = 16;
    let calls = AtomicUsize::new(0);
    let memo = Memoized::new(|| {
        calls.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(10));
        Ok::<_, MirrorError>(vec![1u64, 2, 3])
    });
    let barrier = Barrier::new(THREADS);

    let addresses: Vec<usize> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    memo.get().unwrap() as *const Vec<u64> as usize
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(addresses.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(memo.get().unwrap(), &vec![1, 2, 3]);
}

#[test]
fn resolved_handles_are_shared_across_threads() {
    let name = fuzzy_field(class("app.Person"), RuntimeType::String)
        .names(["name"])
        .find()
        .unwrap();
    let ada = person("Ada");
    std::thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| assert_eq!(name.get(Some(&ada)).unwrap(), Value::from("Ada")));
        }
    });
}

#[test]
fn catalog_lists_declared_then_inherited_members() {
    let catalog = MemberCatalog::new(class("app.Person"));
    let fields: Vec<_> = catalog.fields().iter().map(|f| f.name()).collect();
    assert_eq!(
        fields,
        ["name", "title", "age", "population", "initials", "aliases", "partner"]
    );

    let methods: Vec<_> = catalog.methods().iter().map(|m| m.name()).collect();
    assert_eq!(
        methods,
        [
            "name", "greet", "twice", "mystery", "nickname", "explode", "to_string", "hash_code",
            "equals"
        ]
    );
    assert_eq!(catalog.declared().len(), 13);
}

#[test]
fn void_methods_produce_null() {
    let pair = Value::Object(registry().new_object(&RuntimeType::named("app.Pair")).unwrap());
    let clear = fuzzy_method(class("app.Pair"), RuntimeType::Void).find().unwrap();
    assert_eq!(clear.invoke(Some(&pair), &[]).unwrap(), Value::Null);
    assert!(matches!(
        clear.require(Some(&pair), &[]),
        Err(MirrorError::UnexpectedNull { .. })
    ));
}
