//! Data layer: core types, loading, filtering, aggregation, and export.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse sheet → Dataset + LoadReport (coerce-to-null)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  restrict to adult social care,
//!   └──────────┘  then apply the interactive selection → visible indices
//!        │
//!        ├──────────────────────────────┐
//!        ▼                              ▼
//!   ┌──────────┐                  ┌──────────┐
//!   │ aggregate │  overview,      │  export   │  filtered view →
//!   └──────────┘  ratings,        └──────────┘  .xlsx / .csv bytes
//!                 monthly series,
//!                 map points
//! ```
//!
//! Everything here is a pure function of `(Dataset, FilterSelection)`; the
//! UI layer only renders what these functions return.

pub mod aggregate;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
