use std::path::Path;

use serde::Serialize;
use vmscope::HandlerLocator;

use crate::{
    app::GlobalOptions,
    commands::common::load_module,
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct TypeEntry {
    token: String,
    methods: usize,
    nested: usize,
    handler: Option<String>,
    name: String,
}

#[derive(Debug, Serialize)]
struct TypesOutput {
    types: Vec<TypeEntry>,
    count: usize,
}

pub fn run(path: &Path, namespace: Option<&str>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let module = load_module(path)?;
    let locator = HandlerLocator::default();

    let mut entries = Vec::new();
    for ty in module.types() {
        if let Some(ns) = namespace {
            if ty.namespace != ns {
                continue;
            }
        }

        entries.push(TypeEntry {
            token: ty.token.to_string(),
            methods: ty.methods.len(),
            nested: ty.nested_types.len(),
            handler: locator
                .match_type(ty)
                .map(|(method, signature)| format!("{} ({})", method.token, signature.name())),
            name: ty.full_name(),
        });
    }

    let count = entries.len();
    let output = TypesOutput {
        types: entries,
        count,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(vec![
            ("Token", Align::Left),
            ("Methods", Align::Right),
            ("Nested", Align::Right),
            ("Handler", Align::Left),
            ("Name", Align::Left),
        ]);
        for e in &out.types {
            tw.row(vec![
                e.token.clone(),
                e.methods.to_string(),
                e.nested.to_string(),
                e.handler.clone().unwrap_or_else(|| "-".to_string()),
                e.name.clone(),
            ]);
        }
        tw.print();
        println!("\n{} type(s) listed.", out.count);
    })
}
