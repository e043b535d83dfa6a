// ============================================================================
// UI components — the stage (image + markers + loupe) and the palette panel
// ============================================================================

pub mod palette_panel;
pub mod stage;
