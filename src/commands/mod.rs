// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod assets;
pub mod categories;
pub mod clients;
pub mod depreciation;
pub mod doctor;
pub mod exporter;
pub mod importer;
pub mod owners;
pub mod parameters;
pub mod reports;
pub mod settings;
