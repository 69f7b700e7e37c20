/// Chart layer: presentation-free chart specifications and the renderers
/// that build them from aggregated views. The egui shell consumes the
/// specs; nothing here touches the UI.
pub mod render;
pub mod spec;
