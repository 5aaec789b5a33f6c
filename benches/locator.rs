//! Benchmarks for handler discovery.
//!
//! Builds a synthetic module with a few thousand decoy types and places the handler near
//! the end, then compares the sequential and the parallel scan.

extern crate vmscope;

use std::{hint::black_box, sync::Arc};

use criterion::{criterion_group, criterion_main, Criterion};
use vmscope::{
    handler::VMP_HANDLER_LOCALS,
    metadata::{method::MethodDef, signatures::TypeClass},
    AmbiguityPolicy, EventLog, HandlerLocator, LocatorConfig, ModuleDef, Token, TypeDef,
};

const DECOY_TYPES: u32 = 4096;
const METHODS_PER_TYPE: u32 = 12;

fn decoy_method(token: u32) -> MethodDef {
    // Right shape, one local short of the fingerprint
    MethodDef::builder()
        .token(Token::new(token))
        .returns(TypeClass::Class)
        .param(TypeClass::Class)
        .param(TypeClass::Boolean)
        .locals(VMP_HANDLER_LOCALS.iter().skip(1).copied())
        .build()
        .unwrap()
}

fn synthetic_module() -> ModuleDef {
    let mut types = Vec::new();
    let mut method_token = 0x0600_0001;

    for row in 0..DECOY_TYPES {
        let mut builder = TypeDef::builder().token(Token::new(0x0200_0002 + row));
        for _ in 0..METHODS_PER_TYPE {
            builder = builder.method(decoy_method(method_token));
            method_token += 1;
        }
        types.push(Arc::new(builder.build().unwrap()));
    }

    let handler = MethodDef::builder()
        .token(Token::new(method_token))
        .locals(VMP_HANDLER_LOCALS)
        .build()
        .unwrap();
    let vm_type = TypeDef::builder()
        .token(Token::new(0x0200_0002 + DECOY_TYPES))
        .method(handler)
        .build()
        .unwrap();
    types.push(Arc::new(vm_type));

    ModuleDef::new("bench.dll", types).unwrap()
}

fn bench_discover(c: &mut Criterion) {
    let module = synthetic_module();
    let mut group = c.benchmark_group("discover");

    for (name, parallel) in [("sequential", false), ("parallel", true)] {
        let locator = HandlerLocator::new(LocatorConfig::new().with_parallel(parallel));
        group.bench_function(name, |b| {
            b.iter(|| {
                let found = locator
                    .discover(black_box(&module), &EventLog::new())
                    .unwrap();
                black_box(found)
            });
        });
    }

    group.finish();
}

fn bench_full_scan(c: &mut Criterion) {
    let module = synthetic_module();
    let mut group = c.benchmark_group("full_scan");

    for (name, parallel) in [("sequential", false), ("parallel", true)] {
        let locator = HandlerLocator::new(
            LocatorConfig::new()
                .with_parallel(parallel)
                .with_ambiguity(AmbiguityPolicy::Report),
        );
        group.bench_function(name, |b| {
            b.iter(|| black_box(locator.candidates(black_box(&module))));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_discover, bench_full_scan);
criterion_main!(benches);
