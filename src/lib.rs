//! # Backtrack
//!
//! A small Prolog-style logic engine embedded as a library.
//!
//! ## Features
//!
//! - Typed facts and rules stored under relation names
//! - Unification with atomic rollback on failure
//! - Depth-first rule resolution with chronological backtracking, recursion included
//!
//! ## Example
//!
//! ```rust
//! use backtrack::{Arg, Database};
//!
//! let mut db: Database<&str, &str> = Database::new();
//! db.add_fact("parent", ["alice", "bob"]);
//! db.add_fact("parent", ["bob", "carol"]);
//!
//! // grandparent(X, Z) :- parent(X, Y), parent(Y, Z)
//! let mut rule = db.add_rule("grandparent", [Arg::Var, Arg::Var])?;
//! let (x, z) = (rule.params()[0], rule.params()[1]);
//! let y = rule.var();
//! rule.and("parent", [Arg::Term(x), Arg::Term(y)])?
//!     .and("parent", [Arg::Term(y), Arg::Term(z)])?;
//!
//! let alice = db.constant("alice");
//! let who = db.var();
//! assert!(db.query("grandparent", 2, &[alice, who]));
//! assert_eq!(db.value(who), Some(&"carol"));
//! # Ok::<(), backtrack::Error>(())
//! ```

mod clause;
mod config;
mod database;
mod error;
mod relation;
mod rule;
mod solve;
mod store;
mod term;
mod trail;


pub use clause::{Clause, ClauseId, FactHandle, RuleHandle};
pub use config::Config;
pub use database::{Answer, Arg, Database, RuleBuilder};
pub use error::{Error, Failure, Result};
pub use relation::Relation;
pub use rule::{Goal, Operand, Rule};
pub use term::{AlreadyBound, Term, TermId};
