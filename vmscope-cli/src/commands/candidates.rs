use std::path::Path;

use serde::Serialize;
use vmscope::HandlerLocator;

use crate::{
    app::GlobalOptions,
    commands::common::{handler_label, load_module},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct CandidateEntry {
    index: usize,
    vm_type: String,
    handler: String,
    signature: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct CandidatesOutput {
    candidates: Vec<CandidateEntry>,
    count: usize,
}

pub fn run(path: &Path, opts: &GlobalOptions) -> anyhow::Result<()> {
    let module = load_module(path)?;

    let candidates: Vec<CandidateEntry> = HandlerLocator::default()
        .candidates(&module)
        .iter()
        .map(|candidate| CandidateEntry {
            index: candidate.index,
            vm_type: candidate.vm_type.token.to_string(),
            handler: candidate.method.token.to_string(),
            signature: candidate.signature.clone(),
            name: handler_label(candidate),
        })
        .collect();

    let output = CandidatesOutput {
        count: candidates.len(),
        candidates,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(vec![
            ("#", Align::Right),
            ("Type", Align::Left),
            ("Method", Align::Left),
            ("Signature", Align::Left),
            ("Name", Align::Left),
        ]);
        for e in &out.candidates {
            tw.row(vec![
                e.index.to_string(),
                e.vm_type.clone(),
                e.handler.clone(),
                e.signature.clone(),
                e.name.clone(),
            ]);
        }
        tw.print();
        match out.count {
            0 => println!("\nno qualifying type."),
            1 => println!("\n1 qualifying type."),
            n => println!("\n{n} qualifying types, the first one is selected."),
        }
    })
}
