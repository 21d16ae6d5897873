//! Sykli CI pipeline for the health check endpoint
//!
//! Run locally: sykli run
//! Or: cargo run --bin sykli --features sykli -- --emit | sykli run -

use sykli::{Pipeline, Template};

fn main() {
    let mut p = Pipeline::new();

    // === RESOURCES ===
    let src = p.dir(".");
    let cargo_registry = p.cache("cargo-registry");
    let cargo_git = p.cache("cargo-git");
    let target_cache = p.cache("target");

    // === TEMPLATE ===
    let rust = Template::new()
        .container("rust:1.85")
        .mount_dir(&src, "/src")
        .mount_cache(&cargo_registry, "/usr/local/cargo/registry")
        .mount_cache(&cargo_git, "/usr/local/cargo/git")
        .mount_cache(&target_cache, "/src/target")
        .workdir("/src");

    // === TASKS ===

    // Unit and end-to-end endpoint tests (bind loopback port 0)
    let _ = p
        .task("test")
        .from(&rust)
        .run("cargo test")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("lint")
        .from(&rust)
        .run("cargo clippy --all-targets -- -D warnings")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"]);

    let _ = p
        .task("fmt")
        .from(&rust)
        .run("cargo fmt -- --check")
        .inputs(&["**/*.rs"]);

    let _ = p
        .task("build")
        .from(&rust)
        .run("cargo build --release --bin healthcheck")
        .inputs(&["**/*.rs", "Cargo.toml", "Cargo.lock"])
        .output("binary", "target/release/healthcheck")
        .after(&["test", "lint", "fmt"]);

    // Smoke test: start the binary, probe both endpoints, stop with SIGTERM
    let _ = p
        .task("smoke-test")
        .from(&rust)
        .run(
            r#"#!/bin/bash
set -e

HEALTHCHECK_LISTEN_ADDR=127.0.0.1:18080 ./target/release/healthcheck &
PID=$!
sleep 2

curl -sf -o /dev/null http://127.0.0.1:18080/health-check
curl -sf -o /dev/null http://127.0.0.1:18080/ready-check

kill -TERM $PID
wait $PID
"#,
        )
        .input_from("build", "binary", "/src/target/release/healthcheck")
        .after(&["build"]);

    p.emit();
}
