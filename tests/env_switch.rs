// tests/env_switch.rs

mod common;
use crate::common::builders::{STALE_ENV, write_env_file};
use crate::common::init_tracing;

use std::error::Error;
use std::fs;

use proptest::prelude::*;

use devconsole::config::EndpointsSection;
use devconsole::envfile::{ConfigModeSwitcher, rewrite_entries};
use devconsole::events::EventBus;
use devconsole::types::EnvironmentMode;

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn containerized_switch_rewrites_only_the_endpoint_lines() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_env_file(dir.path(), STALE_ENV);
    let switcher = ConfigModeSwitcher::new(&path, EndpointsSection::default(), EventBus::new());

    switcher.apply(EnvironmentMode::Containerized)?;

    assert_eq!(
        fs::read_to_string(&path)?,
        "DATABASE_URL=postgresql://postgres:password@db:5432/lucidehive?schema=public\n\
         REDIS_URL=redis://redis:6379\n\
         OTHER=keep\n"
    );
    Ok(())
}

#[test]
fn concurrent_switches_never_corrupt_the_file() -> TestResult {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let path = write_env_file(dir.path(), STALE_ENV);
    let bus = EventBus::new();

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let switcher = ConfigModeSwitcher::new(&path, EndpointsSection::default(), bus.clone());
            std::thread::spawn(move || {
                let mode = if i % 2 == 0 {
                    EnvironmentMode::Local
                } else {
                    EnvironmentMode::Containerized
                };
                for _ in 0..20 {
                    switcher.apply(mode).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let contents = fs::read_to_string(&path)?;
    let endpoints = EndpointsSection::default();
    let local = rewrite_entries(
        STALE_ENV,
        &[
            ("DATABASE_URL", endpoints.local.database_url.as_str()),
            ("REDIS_URL", endpoints.local.redis_url.as_str()),
        ],
    );
    let docker = rewrite_entries(
        STALE_ENV,
        &[
            ("DATABASE_URL", endpoints.containerized.database_url.as_str()),
            ("REDIS_URL", endpoints.containerized.redis_url.as_str()),
        ],
    );
    assert!(contents == local || contents == docker, "unexpected contents: {contents}");
    Ok(())
}

fn other_line() -> impl Strategy<Value = String> {
    "[A-Z_]{1,10}=[a-z0-9:/@.]{0,20}".prop_filter("endpoint keys are rewritten", |l| {
        !l.starts_with("DATABASE_URL=") && !l.starts_with("REDIS_URL=")
    })
}

proptest! {
    #[test]
    fn rewrite_is_idempotent_and_leaves_other_lines(
        before in proptest::collection::vec(other_line(), 0..5),
        after in proptest::collection::vec(other_line(), 0..5),
        url in "[a-z]{1,8}://[a-z0-9.:]{1,15}",
    ) {
        let mut lines = before.clone();
        lines.push("DATABASE_URL=old".to_string());
        lines.extend(after.clone());
        let contents = lines.join("\n") + "\n";

        let once = rewrite_entries(&contents, &[("DATABASE_URL", url.as_str())]);
        let twice = rewrite_entries(&once, &[("DATABASE_URL", url.as_str())]);
        prop_assert_eq!(&once, &twice);

        let out: Vec<&str> = once.lines().collect();
        prop_assert_eq!(out.len(), lines.len());
        for (i, line) in out.iter().enumerate() {
            if i == before.len() {
                prop_assert_eq!(*line, format!("DATABASE_URL={url}"));
            } else {
                prop_assert_eq!(*line, lines[i].as_str());
            }
        }
    }
}
