//! # Signet - Email Signature Generator
//!
//! Signet turns a user-editable signature form into markup that survives
//! email clients. It provides:
//!
//! - **Form validation**: per-field errors for a candidate form
//! - **Form controller**: edit / blur / commit lifecycle with touched tracking
//! - **Renderer**: a table-only render tree with inline longhand styles
//! - **Exports**: HTML, plain text, PNG, JPEG and SVG
//! - **Server**: an embedded web form backed by per-session controllers
//!
//! ## Quick Start
//!
//! ```
//! use signet::form::SignatureForm;
//! use signet::render::render;
//!
//! let form = SignatureForm {
//!     name: "Jaden Drury".into(),
//!     title: "Engineer".into(),
//!     phone: "+1 555 0100".into(),
//!     ..Default::default()
//! };
//!
//! let model = form.to_model().expect("valid form");
//! let html = render(&model).to_html();
//! assert!(html.contains("Jaden Drury"));
//! assert!(signet::sanitize::survives_sanitization(&html));
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`form`] | Candidate form, validator, controller |
//! | [`model`] | Validated signature model |
//! | [`render`] | Render tree and HTML / text serialization |
//! | [`export`] | Rich text, raster and vector sinks |
//! | [`sanitize`] | Email-client sanitizer check |
//! | [`server`] | HTTP server and web form |
//! | [`telemetry`] | Tracing subscriber setup |
//! | [`error`] | Error types |

pub mod error;
pub mod export;
pub mod form;
pub mod model;
pub mod render;
pub mod sanitize;
pub mod server;
pub mod telemetry;

// Re-exports for convenience
pub use error::SignetError;
pub use form::{FormController, SignatureForm, validate};
pub use model::SignatureModel;
pub use render::{RenderTree, render};
