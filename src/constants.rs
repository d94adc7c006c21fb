//! Cross-cutting, shared constants.
//!
//! Defaults here mirror the values the training jobs were tuned with. Runtime overrides go
//! through [`Config`](crate::config::Config); prefer reading sizes from there.

/// Number of distinct classes drawn per class-mode batch.
pub const DEFAULT_NUM_CLASSES_PER_BATCH: usize = 32;

/// Sequences per batch.
pub const DEFAULT_BATCH_SIZE: usize = 128;

/// Max tokens kept per sequence; longer sequences are truncated, shorter ones padded.
pub const DEFAULT_MAXLEN: usize = 40;

/// Confidence threshold for class-mode threshold accuracy and point-mode binarization.
pub const DEFAULT_SCORE_THRE: f32 = 0.5;

/// Held-out queries per class in pair-mode evaluation.
pub const DEFAULT_DEV_SIZE: usize = 1;

/// Seed for the single sampling generator.
pub const DEFAULT_SEED: u64 = 230;

/// Bounded prefetch buffer, in batches.
pub const DEFAULT_PREFETCH: usize = 4;

/// Margin between positive and negative scores in the hinge term.
pub const DEFAULT_MARGIN: f32 = 0.3;

/// Floor the positive score is pushed above by the intra-class term of the improved triplet loss.
pub const DEFAULT_INTRA_MARGIN: f32 = 0.8;

/// Weight of the intra-class term of the improved triplet loss.
pub const DEFAULT_INTRA_WEIGHT: f32 = 0.5;

/// Sequences per `(query, positive, query, negative)` quadruple in pair mode.
pub const PAIR_GROUP_SIZE: usize = 4;

/// Sequences per `(query, sample)` row in point mode.
pub const POINT_GROUP_SIZE: usize = 2;

/// Dropout keep probability while training.
pub const TRAINING_KEEP_PROB: f32 = 0.7;

/// Token id used to pad sequences up to `maxlen`.
pub const PAD_TOKEN_ID: u32 = 0;

/// Binarization cut for model predictions (`pred` field).
pub const PREDICTION_CUTOFF: f32 = 0.5;

/// Vector width of the stub represent encoder.
pub const STUB_ENCODER_DIM: usize = 128;
