
use std::cell::Cell;
use std::rc::Rc;

use fixtures::{RecordingHooks, context_for, literal_bodies, shuffled_names};
use minibem::{
    Arg, Body, CompiledBody, Context, KeyPath, MatchValue, MinibemError, Options, Predicate,
    RuntimeHooks, Tree, compile,
};
use serde_json::{Value, json};

#[test]
#[ntest::timeout(100)]
fn test_registrations_compile_in_reverse() {
    let names = shuffled_names(16);
    let compiled = compile(|t| {
        for name in &names {
            t.block(name.as_str()).def().body(name.as_str())?;
        }
        Ok(())
    })
    .unwrap();

    let expected: Vec<Value> = names.iter().rev().map(|name| json!(name)).collect();
    assert_eq!(
        literal_bodies(&compiled),
        expected,
        "latest registration should come first"
    );
}

#[test]
#[ntest::timeout(100)]
fn test_nested_predicates_concatenate() {
    let compiled = compile(|t| {
        t.block("menu").r#mod("theme", "dark").nest(|t| {
            t.elem("item").nest(|t| t.elem_mod("state", "active").tag().body("li"))
        })
    })
    .unwrap();

    assert_eq!(compiled.templates.len(), 1);
    assert_eq!(
        compiled.templates[0].predicates(),
        &[
            Predicate::block("menu"),
            Predicate::r#mod("theme", "dark"),
            Predicate::elem("item"),
            Predicate::elem_mod("state", "active"),
            Predicate::mode("tag"),
        ]
    );
}

#[test]
#[ntest::timeout(100)]
fn test_mapping_body_expands_in_key_order() {
    let mut tree = Tree::new();
    tree.block("b")
        .elem("e")
        .body(json!({ "a": "bodyA", "b": "bodyB" }))
        .unwrap();

    let pending = tree.templates();
    assert_eq!(pending.len(), 2);
    assert_eq!(
        pending[0].predicates(),
        &[Predicate::block("b"), Predicate::elem("e"), Predicate::mode("a")]
    );
    assert_eq!(pending[0].body().literal(), Some(&json!("bodyA")));
    assert_eq!(
        pending[1].predicates(),
        &[Predicate::block("b"), Predicate::elem("e"), Predicate::mode("b")]
    );

    let compiled = tree.finish();
    assert_eq!(literal_bodies(&compiled), vec![json!("bodyB"), json!("bodyA")]);
}

#[test]
#[ntest::timeout(100)]
fn test_mapping_body_under_mode_stays_literal() {
    let compiled = compile(|t| {
        t.block("b")
            .content()
            .body(json!({ "a": "bodyA", "b": "bodyB" }))
    })
    .unwrap();

    assert_eq!(compiled.templates.len(), 1);
    assert_eq!(
        compiled.templates[0].body().literal(),
        Some(&json!({ "a": "bodyA", "b": "bodyB" }))
    );
}

#[test]
#[ntest::timeout(100)]
fn test_mapping_body_under_custom_predicate_expands() {
    let compiled = compile(|t| {
        t.block("b")
            .r#match([Arg::custom(|context| context.position > 1)])?
            .body(Body::map([
                ("tag", Body::from("span")),
                ("attrs", Body::func(|_, _| json!({ "role": "x" }))),
            ]))
    })
    .unwrap();

    assert_eq!(compiled.templates.len(), 2);
    assert_eq!(compiled.templates[0].mode(), Some("attrs"));
    assert_eq!(compiled.templates[1].mode(), Some("tag"));
}

#[test]
#[ntest::timeout(100)]
fn test_wrap_is_folded_into_body() {
    let compiled = compile(|t| t.block("b").wrap().body(json!({ "block": "outer" }))).unwrap();

    let template = &compiled.templates[0];
    assert!(
        template.predicates().iter().all(|p| !p.is_aspect()),
        "aspects should not remain among the predicates"
    );
    assert_eq!(
        template.predicates(),
        &[Predicate::block("b"), Predicate::mode("default")]
    );
    assert!(matches!(template.body(), CompiledBody::Wrap(_)));
    assert_eq!(template.body().literal(), None);

    let mut hooks = RecordingHooks::default();
    let mut context = context_for("b", None, "default");
    let out = template.body().invoke(&mut context, &mut hooks);
    assert_eq!(out, json!({ "wrapped": { "block": "outer" } }));
    assert_eq!(hooks.calls, vec!["apply_ctx_wrapped"]);
}

#[test]
#[ntest::timeout(100)]
fn test_additive_methods() {
    let compiled = compile(|t| {
        t.block("b").nest(|t| {
            t.append_content().body("tail")?;
            t.add_attrs().body(json!({ "title": "t" }))?;
            t.add_mix().body(json!({ "block": "m" }))
        })
    })
    .unwrap();

    let mut hooks = RecordingHooks::default()
        .with_mode("content", json!("body"))
        .with_mode("attrs", json!({ "id": "i" }))
        .with_mode("mix", json!([{ "block": "x" }]));
    let mut context = context_for("b", None, "");

    let modes: Vec<_> = compiled.templates.iter().map(|t| t.mode()).collect();
    assert_eq!(modes, vec![Some("mix"), Some("attrs"), Some("content")]);

    let outputs: Vec<Value> = compiled
        .templates
        .iter()
        .map(|t| t.body().invoke(&mut context, &mut hooks))
        .collect();
    assert_eq!(
        outputs,
        vec![
            json!([{ "block": "x" }, { "block": "m" }]),
            json!({ "id": "i", "title": "t" }),
            json!(["body", "tail"]),
        ]
    );
    assert_eq!(context.field("attrs"), Some(&json!({ "id": "i", "title": "t" })));
}

#[test]
#[ntest::timeout(100)]
fn test_match_errors() {
    let mut tree = Tree::new();
    assert_eq!(
        tree.r#match(Vec::<Arg>::new()).err(),
        Some(MinibemError::MissingPredicate)
    );
    assert_eq!(
        tree.r#match([5_i64]).err(),
        Some(MinibemError::InvalidPredicate {
            argument: "5".to_string()
        })
    );

    let error = tree.block("b").call("tag", vec![Arg::from("span")]).err();
    assert_eq!(
        error.map(|e| e.to_string()).unwrap_or_default(),
        r#"Predicate .tag() should not have arguments but ["span"] passed"#
    );
    assert_eq!(tree.depth(), 0);
}

#[test]
#[ntest::timeout(100)]
fn test_errors_propagate_out_of_build() {
    let result = compile(|t| {
        t.block("b").nest(|t| {
            t.elem("e").body("x")?;
            t.r#match([json!("not a predicate")])?.body("never")
        })
    });
    assert!(matches!(result, Err(MinibemError::InvalidPredicate { .. })));
}

#[test]
#[ntest::timeout(100)]
fn test_button_end_to_end() {
    let compiled = compile(|t| {
        t.block("btn").def().body("plain")?;
        t.block("btn").r#mod("size", "m").def().body("medium")
    })
    .unwrap();

    assert_eq!(literal_bodies(&compiled), vec![json!("medium"), json!("plain")]);
    assert_eq!(
        compiled.templates[0].predicates(),
        &[
            Predicate::block("btn"),
            Predicate::r#mod("size", "m"),
            Predicate::mode("default"),
        ]
    );
    assert_eq!(
        compiled.templates[1].predicates(),
        &[Predicate::block("btn"), Predicate::mode("default")]
    );

    let mut context = context_for("btn", None, "default");
    context.mods.insert("size".to_string(), json!("m"));
    let found = compiled.first_match(&context).unwrap();
    assert_eq!(found.body().literal(), Some(&json!("medium")));

    context.mods.clear();
    let found = compiled.first_match(&context).unwrap();
    assert_eq!(found.body().literal(), Some(&json!("plain")));

    context.block = "link".to_string();
    assert!(compiled.first_match(&context).is_none());
}

#[test]
#[ntest::timeout(100)]
fn test_custom_predicates_see_context() {
    let checked = Rc::new(Cell::new(0_usize));
    let counter = checked.clone();
    let compiled = compile(move |t| {
        t.r#match([
            Arg::custom(move |context| {
                counter.set(counter.get().saturating_add(1));
                context.is_first()
            }),
            Arg::from(Predicate::property(KeyPath::field("_mode"), "tag")),
        ])?
        .body("first")
    })
    .unwrap();

    let mut context = context_for("b", None, "tag");
    context.position = 1;
    context.list_length = 2;
    assert!(compiled.first_match(&context).is_some());
    context.position = 2;
    assert!(compiled.first_match(&context).is_none());
    assert_eq!(checked.get(), 2);

    context.mode = "content".to_string();
    assert!(compiled.first_match(&context).is_none());
    assert_eq!(checked.get(), 2, "the mode test runs before the custom one");
}

#[test]
#[ntest::timeout(100)]
fn test_match_stores_last_argument_first() {
    let compiled = compile(|t| {
        t.block("b")
            .r#match([Arg::from(Predicate::Replace), Arg::from(Predicate::Wrap)])?
            .body("x")
    })
    .unwrap();

    let template = &compiled.templates[0];
    assert_eq!(template.predicates(), &[Predicate::block("b")]);
    assert!(
        matches!(
            template.body(),
            CompiledBody::Replace(inner) if matches!(**inner, CompiledBody::Wrap(_))
        ),
        "the first argument should be the outermost aspect, got {:?}",
        template.body()
    );

    let compiled = compile(|t| {
        t.r#match([
            Arg::from(Predicate::elem("e")),
            Arg::from(Predicate::block("b")),
        ])?
        .body("x")
    })
    .unwrap();
    assert_eq!(
        compiled.templates[0].predicates(),
        &[Predicate::block("b"), Predicate::elem("e")]
    );
}

#[test]
#[ntest::timeout(100)]
fn test_modifier_presence() {
    let compiled = compile(|t| {
        t.block("b")
            .r#mod("disabled", MatchValue::Present)
            .attrs()
            .body(json!({ "disabled": true }))
    })
    .unwrap();

    let mut context = context_for("b", None, "attrs");
    assert!(compiled.first_match(&context).is_none());
    context.mods.insert("disabled".to_string(), json!(false));
    assert!(compiled.first_match(&context).is_none());
    context.mods.insert("disabled".to_string(), json!(true));
    assert!(compiled.first_match(&context).is_some());
}

#[test]
#[ntest::timeout(100)]
fn test_inline_compiler_options() {
    let compiled = compile(|t| {
        t.xjst_options(json!({ "escapeContent": false }).as_object().cloned().unwrap())
            .body(Value::Null)?;
        t.block("b").tag().body("span")?;
        t.call("xjstOptions", vec![Arg::from(json!({ "naming": { "elem": "-" } }))])?
            .body(Value::Null)
    })
    .unwrap();

    let options = compiled.options(&Options::default());
    assert!(!options.escape_content);
    assert_eq!(options.naming.elem, "-");
    assert_eq!(options.naming.mod_name, "_");

    let context = Context::new(&options);
    assert_eq!(context.class_builder().build("b", Some("e")), "b-e");
    assert!(!context.escape_content);
}

#[test]
#[ntest::timeout(100)]
fn test_initializers_are_kept() {
    let compiled = compile(|t| {
        t.oninit(|hooks| {
            let mut context = Context::default();
            hooks.apply(&mut context, "init");
        });
        Ok(())
    })
    .unwrap();
    assert!(compiled.templates.is_empty());
    assert_eq!(compiled.initializers.len(), 1);

    let mut hooks = RecordingHooks::default();
    for init in &compiled.initializers {
        init(&mut hooks as &mut dyn RuntimeHooks);
    }
    assert_eq!(hooks.calls, vec!["apply:init"]);
}

#[test]
#[ntest::timeout(100)]
fn test_forgotten_body_does_not_leak_scope() {
    let mut tree = Tree::new();
    tree.block("lost").elem("e").tag();
    tree.block("b").content().body("c").unwrap();

    let compiled = tree.finish();
    assert_eq!(compiled.templates.len(), 1);
    assert_eq!(
        compiled.templates[0].predicates(),
        &[Predicate::block("b"), Predicate::mode("content")]
    );
}

#[test]
#[ntest::timeout(100)]
fn test_dynamic_calls_match_typed_calls() {
    let typed = compile(|t| t.block("b").elem("e").add_mods().body(json!({ "x": "y" }))).unwrap();
    let dynamic = compile(|t| {
        t.call("block", vec!["b".into()])?
            .call("elem", vec!["e".into()])?
            .call("addMods", vec![])?
            .body(json!({ "x": "y" }))
    })
    .unwrap();

    assert_eq!(
        typed.templates[0].predicates(),
        dynamic.templates[0].predicates()
    );
    assert_eq!(
        format!("{:?}", typed.templates[0].body()),
        format!("{:?}", dynamic.templates[0].body())
    );
}
