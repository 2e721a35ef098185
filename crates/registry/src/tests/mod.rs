//! Registry scenario tests: lifecycle, cross-references, lazy trees and freezing.

mod tree;
