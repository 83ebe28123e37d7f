pub mod pkgref;
pub mod vrs;

#[cfg(test)]
use indoc as _;
