//! Codebook normalization, label map construction and value labeling.
//!
//! A codebook arrives in whatever shape its author chose. [`normalize_codebook`]
//! maps it onto the four canonical columns, [`build_label_maps`] turns it into
//! lookup tables, and [`apply_value_labels`] rewrites dataset columns with the
//! human labels.

pub mod apply;
pub mod cell;
pub mod maps;
pub mod normalize;

pub use apply::apply_value_labels;
pub use cell::any_to_cell;
pub use maps::{build_label_maps, label_maps_from_codebook};
pub use normalize::{
    CanonicalColumn, ColumnResolution, ColumnResolver, ColumnStrategy, PositionalFallback,
    SynonymMatch, codebook_frame, normalize_codebook,
};
