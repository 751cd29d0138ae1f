// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Alex Sizykh

pub mod composer;
pub mod dispatch;
pub mod predictors;
pub mod records;
pub mod report;
pub mod validators;
