// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Builders and helpers shared by other crates' tests.

use chrono::{TimeZone, Utc};

use crate::{FakeClock, ServiceInformation, ServiceStatus};

/// A fake clock pinned to a fixed, readable instant.
#[allow(clippy::unwrap_used)]
pub fn fixed_clock() -> FakeClock {
    FakeClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap())
}

/// Instance in an arbitrary status, empty info.
pub fn instance(name: &str, service: &str, status: ServiceStatus) -> ServiceInformation {
    let mut inst = ServiceInformation::starting(name, service);
    inst.status = status;
    inst
}
