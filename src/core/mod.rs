//! # Core Console Logic
//!
//! Everything the console does that is not terminal I/O or HTTP lives here.
//! The core knows nothing about ratatui or reqwest.
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!                  │            CORE              │
//!                  │        (this module)         │
//!                  │                              │
//!                  │  • Console (state aggregate) │
//!                  │  • Action  (events)          │
//!                  │  • update() (reducer)        │
//!                  │  • Router / visibility       │
//!                  │                              │
//!                  │  No I/O. No UI. Pure.        │
//!                  └──────────────┬───────────────┘
//!                                 │
//!                    ┌────────────┴────────────┐
//!                    ▼                         ▼
//!             ┌────────────┐            ┌────────────┐
//!             │    TUI     │            │    API     │
//!             │  Adapter   │            │  (reqwest) │
//!             │ (ratatui)  │            │            │
//!             └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: the `Console` aggregate (session, router, view, alerts)
//! - [`action`]: the `Action` enum and `update()` reducer
//! - [`router`]: page registry and the navigation state machine
//! - [`route`]: fragment parsing (`#!page?k=v`)
//! - [`session`]: durable identity and role checks
//! - [`visibility`]: role-gated view regions
//! - [`poller`]: pending-work notification state machine
//! - [`alert`]: transient status banners
//! - [`config`]: TOML config with override hierarchy

pub mod action;
pub mod alert;
pub mod config;
pub mod poller;
pub mod route;
pub mod router;
pub mod session;
pub mod state;
pub mod visibility;
