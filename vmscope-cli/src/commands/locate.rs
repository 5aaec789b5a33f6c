use std::{path::Path, str::FromStr};

use anyhow::{anyhow, Context};
use serde::Serialize;
use vmscope::{AmbiguityPolicy, Event, EventLog, HandlerLocator, LocatorConfig};

use crate::{
    app::GlobalOptions,
    commands::common::{file_display_name, load_module},
    output::print_output,
};

#[derive(Debug, Serialize)]
struct HandlerInfo {
    vm_type: String,
    vm_type_name: String,
    handler: String,
    handler_name: String,
    signature: String,
}

#[derive(Debug, Serialize)]
struct LocateOutput {
    file: String,
    module: String,
    types_scanned: usize,
    handler: Option<HandlerInfo>,
    error: Option<String>,
    warnings: Vec<String>,
    events: Vec<Event>,
}

pub fn run(
    path: &Path,
    parallel: bool,
    ambiguity: &str,
    opts: &GlobalOptions,
) -> anyhow::Result<()> {
    let ambiguity = AmbiguityPolicy::from_str(ambiguity)
        .with_context(|| format!("unknown ambiguity policy '{ambiguity}' (first, report, reject)"))?;
    let module = load_module(path)?;

    let locator = HandlerLocator::new(
        LocatorConfig::new()
            .with_parallel(parallel)
            .with_ambiguity(ambiguity),
    );
    let events = EventLog::new();
    let result = locator.discover(&module, &events);

    let output = LocateOutput {
        file: file_display_name(path),
        module: module.name().to_string(),
        types_scanned: module.types().len(),
        handler: result.as_ref().ok().map(|found| HandlerInfo {
            vm_type: found.vm_type().token.to_string(),
            vm_type_name: found.vm_type().full_name(),
            handler: found.method().token.to_string(),
            handler_name: found.method().name.clone(),
            signature: found.signature().to_string(),
        }),
        error: result.as_ref().err().map(ToString::to_string),
        warnings: events.warnings().map(|e| e.message.clone()).collect(),
        events: events.iter().cloned().collect(),
    };

    print_output(&output, opts, |out| {
        println!("{}: module '{}', {} types", out.file, out.module, out.types_scanned);
        match &out.handler {
            Some(info) => {
                println!("  VM type:          {} ({})", info.vm_type_name, info.vm_type);
                println!("  Function handler: {} ({})", info.handler_name, info.handler);
                println!("  Signature:        {}", info.signature);
            }
            None => println!("  no VM function handler found"),
        }

        if !out.warnings.is_empty() {
            println!("  Warnings:");
            for warning in &out.warnings {
                println!("    - {warning}");
            }
        }
    })?;

    result.map(|_| ()).map_err(|err| anyhow!(err))
}
