//! Settings structures for the viewer UI.

/// Interaction-related toggles.
#[derive(Debug, Clone)]
pub struct SettingsInteraction {
    pub dragging_enabled: bool,
    pub hover_enabled: bool,
    pub node_clicking_enabled: bool,
    pub node_selection_enabled: bool,
}

impl Default for SettingsInteraction {
    fn default() -> Self {
        Self {
            dragging_enabled: true,
            hover_enabled: true,
            node_clicking_enabled: false,
            node_selection_enabled: false,
        }
    }
}

/// Visual style toggles.
#[derive(Debug, Clone)]
pub struct SettingsStyle {
    /// Draw icon/title/id cards over nodes.
    pub node_cards: bool,
    /// Fade new nodes and edges in.
    pub fade_in: bool,
    /// Colour connectors with the purple-to-blue gradient.
    pub edge_gradient: bool,
}

impl Default for SettingsStyle {
    fn default() -> Self {
        Self {
            node_cards: true,
            fade_in: true,
            edge_gradient: true,
        }
    }
}

/// Navigation & viewport parameters.
#[derive(Debug, Clone)]
pub struct SettingsNavigation {
    pub fit_to_screen_enabled: bool,
    pub zoom_and_pan_enabled: bool,
    pub zoom_speed: f32,
    pub fit_to_screen_padding: f32,
}

impl Default for SettingsNavigation {
    fn default() -> Self {
        Self {
            // Mutually exclusive: only one should be true
            fit_to_screen_enabled: true,
            zoom_and_pan_enabled: false,
            zoom_speed: 0.05,
            fit_to_screen_padding: 0.15,
        }
    }
}
