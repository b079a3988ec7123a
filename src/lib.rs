//! # afip-invoicer
//!
//! Automated electronic invoice submission against the AFIP portal, driven
//! over the Chrome DevTools Protocol (CDP).
//!
//! The portal caps the amount of a single invoice, so a requested total above
//! the cap is split into capped-size chunks and one invoice is submitted per
//! chunk. The flow is a strictly sequential UI macro: log in, open the
//! invoice generator (which the portal spawns in a second tab), then walk the
//! multi-step form once per chunk.
//!
//! ```rust,no_run
//! use afip_invoicer::{Config, InvoiceRequest, InvoicingDriver, LaunchOptions, PortalSession, TypingPace};
//! use rust_decimal::Decimal;
//!
//! # fn main() -> afip_invoicer::Result<()> {
//! let request = InvoiceRequest::new(Decimal::from(250_000), "Servicios profesionales", TypingPace::Human)?;
//! let config = Config::load(None)?;
//! let session = PortalSession::launch(LaunchOptions::default())?;
//!
//! let summary = InvoicingDriver::new(session, config).run(&request)?;
//! println!("submitted {} invoices", summary.invoices_submitted);
//! # Ok(())
//! # }
//! ```
//!
//! Submitting an invoice has real side effects on an external system; there
//! is no dry-run mode.
//!
//! ## Module Overview
//!
//! - [`browser`]: Chrome session management and page interaction primitives
//! - [`portal`]: declarative map of the portal's selectors and form choices
//! - [`invoice`]: request validation and amount splitting
//! - [`config`]: credentials, cap and portal overrides
//! - [`driver`]: the sequential invoicing flow
//! - [`error`]: error types and result alias

pub mod browser;
pub mod config;
pub mod driver;
pub mod error;
pub mod invoice;
pub mod portal;

pub use browser::{LaunchOptions, PortalSession};
pub use config::{Config, Credentials};
pub use driver::{InvoicingDriver, RunSummary, Stage};
pub use error::{InvoiceError, Result};
pub use invoice::{chunk_amounts, chunk_count, InvoiceRequest, TypingPace, MAX_INVOICE_AMOUNT};
pub use portal::{FormChoices, PortalMap};
