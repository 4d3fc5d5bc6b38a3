//! # Router Module
//!
//! Routing keys for exact-match dispatch.
//!
//! ## Overview
//!
//! A route is identified by a [`RouteKey`]: the request path plus a
//! [`RequestMethod`]. Registries build a `RouteKey -> handler` table once at
//! startup and look requests up against it at request time.
//!
//! There is no pattern matching, no wildcard support and no path-parameter
//! extraction. The path registered by a controller and the path carried by a
//! request must be byte-identical for the lookup to succeed:
//!
//! ```rust
//! use dispatch_core::router::{RequestMethod, RouteKey};
//!
//! let registered = RouteKey::new("/hello", RequestMethod::Get);
//! assert_eq!(registered, RouteKey::new("/hello", RequestMethod::Get));
//! assert_ne!(registered, RouteKey::new("/hello/", RequestMethod::Get));
//! assert_ne!(registered, RouteKey::new("/hello", RequestMethod::Post));
//! ```

mod key;

pub use key::{RequestMethod, RouteKey, UnsupportedMethod};
