// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of the release aggregate under arbitrary command sequences

use cim_release::aggregate::ReleaseAggregate;
use cim_release::domain::{BumpType, ReleaseState, ReleaseStrategy};
use proptest::prelude::*;

use crate::fixtures::{cargo_package, version, REPO};

#[derive(Debug, Clone)]
enum Command {
    AddPackage(u8),
    SetVersion(u8),
    Plan,
    SetVersions,
    GenerateNotes,
    Approve,
    StartPublish,
    Complete,
    Fail,
    Cancel,
}

fn command_strategy() -> impl Strategy<Value = Command> {
    prop_oneof![
        (0u8..4).prop_map(Command::AddPackage),
        (0u8..4).prop_map(Command::SetVersion),
        Just(Command::Plan),
        Just(Command::SetVersions),
        Just(Command::GenerateNotes),
        Just(Command::Approve),
        Just(Command::StartPublish),
        Just(Command::Complete),
        Just(Command::Fail),
        Just(Command::Cancel),
    ]
}

fn apply(release: &mut ReleaseAggregate, command: &Command) -> bool {
    let result = match command {
        Command::AddPackage(n) => release.add_package(cargo_package(&format!("pkg{n}"), "1.0.0")),
        Command::SetVersion(n) => {
            release.set_package_version(&format!("pkg{n}"), version("1.1.0"), BumpType::Minor)
        }
        Command::Plan => release.plan(),
        Command::SetVersions => release.set_versions(),
        Command::GenerateNotes => release.generate_notes(),
        Command::Approve => release.approve("prop"),
        Command::StartPublish => release.start_publish(),
        Command::Complete => release.complete(),
        Command::Fail => release.fail("prop"),
        Command::Cancel => release.cancel("prop"),
    };
    result.is_ok()
}

proptest! {
    /// A rejected command leaves state, packages and buffer untouched
    #[test]
    fn prop_rejected_commands_have_no_effect(commands in prop::collection::vec(command_strategy(), 0..40)) {
        let mut release = ReleaseAggregate::create(REPO, "v1", "HEAD", ReleaseStrategy::Independent);
        for command in &commands {
            let before = release.clone();
            if !apply(&mut release, command) {
                prop_assert_eq!(&release, &before);
            }
        }
    }

    /// Terminal states are absorbing
    #[test]
    fn prop_terminal_states_absorb(commands in prop::collection::vec(command_strategy(), 0..40)) {
        let mut release = ReleaseAggregate::create(REPO, "v1", "HEAD", ReleaseStrategy::Independent);
        let mut terminal: Option<ReleaseState> = None;
        for command in &commands {
            apply(&mut release, command);
            if let Some(state) = terminal {
                prop_assert_eq!(release.state(), state);
            } else if release.is_terminal() {
                terminal = Some(release.state());
            }
        }
    }

    /// Each accepted command appends at least one event; the buffer drains once
    #[test]
    fn prop_events_track_accepted_commands(commands in prop::collection::vec(command_strategy(), 0..40)) {
        let mut release = ReleaseAggregate::create(REPO, "v1", "HEAD", ReleaseStrategy::Independent);
        let mut accepted = 1usize;
        for command in &commands {
            let before = release.pending_events().len();
            let ok = apply(&mut release, command);
            let after = release.pending_events().len();
            if ok {
                accepted += 1;
                prop_assert!(after > before);
            } else {
                prop_assert_eq!(after, before);
            }
        }
        prop_assert!(release.flush_events().len() >= accepted);
        prop_assert!(release.flush_events().is_empty());
    }
}
