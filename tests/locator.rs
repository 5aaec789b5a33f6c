//! End-to-end discovery over serialized module dumps.

use std::io::Write;

use vmscope::prelude::*;

const LOCALS: &str = r#"[
    "System.Object",
    "System.Int32",
    "System.Reflection.MethodInfo",
    "System.Reflection.ParameterInfo[]",
    "System.Type[]",
    "System.Reflection.Emit.DynamicMethod",
    "System.Reflection.Emit.ILGenerator"
]"#;

/// A module protected with a 3.5-era protector: the handler lives in a type nested in the
/// runtime class, an instance method returning a class and taking a class and a bool.
fn legacy_dump() -> String {
    format!(
        r#"{{
        "name": "crackme.exe",
        "types": [
            {{ "token": "0x02000001", "name": "<Module>" }},
            {{
                "token": "0x02000002",
                "namespace": "CrackMe",
                "name": "Program",
                "methods": [
                    {{ "token": "0x06000001", "name": "Main", "flags": 150, "params": ["szarray"] }}
                ]
            }},
            {{
                "token": "0x02000003",
                "name": "VMRuntime",
                "methods": [
                    {{ "token": "0x06000002", "name": ".ctor", "flags": 6278 }}
                ],
                "nested_types": [
                    {{
                        "token": "0x02000004",
                        "name": "Dispatcher",
                        "methods": [
                            {{
                                "token": "0x06000003",
                                "name": "Handle",
                                "flags": 129,
                                "return_type": "class",
                                "params": ["class", "boolean"],
                                "locals": {LOCALS}
                            }}
                        ]
                    }}
                ]
            }},
            {{
                "token": "0x02000005",
                "name": "Decoy",
                "methods": [
                    {{
                        "token": "0x06000004",
                        "name": "Handle",
                        "flags": 129,
                        "return_type": "class",
                        "params": ["class", "boolean"],
                        "locals": {LOCALS}
                    }}
                ]
            }}
        ]
    }}"#
    )
}

/// A module protected with a 3.6-era protector: an instance `void Invoke()`, declared after a
/// static decoy carrying the same locals.
fn parameterless_dump() -> String {
    format!(
        r#"{{
        "name": "app.dll",
        "types": [
            {{
                "token": 33554434,
                "name": "Runtime",
                "methods": [
                    {{ "token": "0x06000010", "name": "Run", "flags": 22, "locals": {LOCALS} }},
                    {{ "token": "0x06000011", "name": "Invoke", "flags": 134, "return_type": "void", "locals": {LOCALS} }}
                ]
            }}
        ]
    }}"#
    )
}

#[test]
fn test_legacy_handler_in_nested_type() -> vmscope::Result<()> {
    let module = ModuleDef::from_json(&legacy_dump())?;
    let events = EventLog::new();

    let handler = HandlerLocator::default().discover(&module, &events)?;
    assert_eq!(handler.vm_type().token, Token::new(0x02000004));
    assert_eq!(handler.vm_type().name, "Dispatcher");
    assert_eq!(handler.method().token, Token::new(0x06000003));
    assert_eq!(handler.signature(), "legacy");

    let found: Vec<_> = events.filter_kind(EventKind::HandlerFound).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].vm_type, Some(Token::new(0x02000004)));
    assert_eq!(found[0].method, Some(Token::new(0x06000003)));
    Ok(())
}

#[test]
fn test_static_method_is_skipped() -> vmscope::Result<()> {
    let module = ModuleDef::from_json(&parameterless_dump())?;
    let handler = HandlerLocator::default().discover(&module, &EventLog::new())?;

    // 0x06000010 is static (flags 0x16)
    assert_eq!(handler.method().token, Token::new(0x06000011));
    assert_eq!(handler.signature(), "parameterless");
    Ok(())
}

#[test]
fn test_object_return_does_not_satisfy_legacy_shape() -> vmscope::Result<()> {
    let dump = legacy_dump()
        .replace(r#""return_type": "class""#, r#""return_type": "object""#);
    let module = ModuleDef::from_json(&dump)?;
    let events = EventLog::new();

    let result = HandlerLocator::default().discover(&module, &events);
    assert!(matches!(result, Err(Error::HandlerNotFound)));
    assert_eq!(events.len(), 1);
    assert!(events.has(EventKind::HandlerNotFound));
    Ok(())
}

#[test]
fn test_ambiguity_policies() -> vmscope::Result<()> {
    let module = ModuleDef::from_json(&legacy_dump())?;

    let events = EventLog::new();
    let reported = HandlerLocator::new(LocatorConfig::new().with_ambiguity(AmbiguityPolicy::Report))
        .discover(&module, &events)?;
    assert_eq!(reported.vm_type().token, Token::new(0x02000004));
    let ambiguous: Vec<_> = events.filter_kind(EventKind::AmbiguousHandler).collect();
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].vm_type, Some(Token::new(0x02000005)));

    let rejected = HandlerLocator::new(LocatorConfig::new().with_ambiguity(AmbiguityPolicy::Reject))
        .discover(&module, &EventLog::new());
    match rejected {
        Err(Error::AmbiguousHandler(tokens)) => {
            assert_eq!(tokens, vec![Token::new(0x02000004), Token::new(0x02000005)]);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_parallel_scan_agrees() -> vmscope::Result<()> {
    let module = ModuleDef::from_json(&legacy_dump())?;
    let sequential = HandlerLocator::default().discover(&module, &EventLog::new())?;
    let parallel = HandlerLocator::new(LocatorConfig::new().with_parallel(true))
        .discover(&module, &EventLog::new())?;

    assert_eq!(sequential.vm_type().token, parallel.vm_type().token);
    assert_eq!(sequential.method().token, parallel.method().token);
    Ok(())
}

#[test]
fn test_candidates_in_traversal_order() -> vmscope::Result<()> {
    let module = ModuleDef::from_json(&legacy_dump())?;
    let candidates = HandlerLocator::default().candidates(&module);

    let types: Vec<_> = candidates.iter().map(|c| c.vm_type.token).collect();
    assert_eq!(types, vec![Token::new(0x02000004), Token::new(0x02000005)]);
    assert_eq!(candidates[0].index, 3);
    Ok(())
}

#[test]
fn test_runtime_context_from_file() -> vmscope::Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    file.write_all(parameterless_dump().as_bytes())?;

    let module = ModuleDef::from_path(file.path())?;
    let context = RuntimeContext::new();
    let runtime = context.discover(&HandlerLocator::default(), &module)?;
    assert_eq!(runtime.function_handler().name, "Invoke");
    assert_eq!(
        module.declaring_type(runtime.function_handler().token).map(|t| t.token),
        Some(runtime.vm_type().token)
    );

    let second = VmRuntimeStructure::from(HandlerLocator::default().discover(&module, &EventLog::new())?);
    assert!(matches!(context.set(second), Err(Error::AlreadyAssigned)));
    Ok(())
}

#[test]
fn test_malformed_dumps() {
    assert!(matches!(ModuleDef::from_json(""), Err(Error::Malformed { .. })));
    assert!(matches!(ModuleDef::from_json("{\"types\": 3}"), Err(Error::Malformed { .. })));

    let duplicate = r#"{ "types": [ { "token": "0x02000002" }, { "token": "0x02000002" } ] }"#;
    assert!(matches!(ModuleDef::from_json(duplicate), Err(Error::Malformed { .. })));
}
