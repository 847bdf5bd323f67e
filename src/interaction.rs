//! Transient UI state: zoom level, hovered element and sticky selection.
//!
//! The three cells are independent. Each one has a single writer (its
//! handler below) and any number of readers in the scene builder.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::ir::{ElementKind, ElementRef};
use crate::layout::{Layout, Point};

static EVENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(enter|click):(device|link):([A-Za-z0-9_.-]+)|(leave|zoom-in|zoom-out|zoom-reset))$")
        .unwrap()
});

/// Zoom factor kept in whole tenths so repeated steps land exactly on the bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    tenths: u8,
}

impl Zoom {
    const MIN_TENTHS: u8 = 6;
    const MAX_TENTHS: u8 = 25;
    const DEFAULT_TENTHS: u8 = 10;

    /// Nearest step to `scale`, clamped to the 0.6..=2.5 range.
    pub fn from_scale(scale: f32) -> Self {
        let tenths = if scale.is_finite() {
            (scale * 10.0)
                .round()
                .clamp(Self::MIN_TENTHS as f32, Self::MAX_TENTHS as f32) as u8
        } else {
            Self::DEFAULT_TENTHS
        };
        Self { tenths }
    }

    pub fn scale(self) -> f32 {
        self.tenths as f32 / 10.0
    }

    pub fn zoom_in(&mut self) {
        self.tenths = (self.tenths + 1).min(Self::MAX_TENTHS);
    }

    pub fn zoom_out(&mut self) {
        self.tenths = self.tenths.saturating_sub(1).max(Self::MIN_TENTHS);
    }

    pub fn reset(&mut self) {
        self.tenths = Self::DEFAULT_TENTHS;
    }

    pub fn percent(self) -> u32 {
        self.tenths as u32 * 10
    }
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            tenths: Self::DEFAULT_TENTHS,
        }
    }
}

/// A highlighted element with what its tooltip needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Focus {
    pub element: ElementRef,
    pub label: String,
    pub text: Option<String>,
    pub anchor: Point,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    pub zoom: Zoom,
    pub hover: Option<Focus>,
    pub selected: Option<Focus>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Enter(ElementRef),
    Leave,
    Click(ElementRef),
    ZoomIn,
    ZoomOut,
    ZoomReset,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event `{0}` (expected enter:<device|link>:<id>, click:<device|link>:<id>, leave, zoom-in, zoom-out or zoom-reset)")]
pub struct ParseEventError(pub String);

impl FromStr for Event {
    type Err = ParseEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let caps = EVENT_RE
            .captures(trimmed)
            .ok_or_else(|| ParseEventError(trimmed.to_string()))?;
        if let Some(action) = caps.get(4) {
            return Ok(match action.as_str() {
                "leave" => Event::Leave,
                "zoom-in" => Event::ZoomIn,
                "zoom-out" => Event::ZoomOut,
                _ => Event::ZoomReset,
            });
        }
        let kind = caps
            .get(2)
            .and_then(|m| ElementKind::from_token(m.as_str()))
            .ok_or_else(|| ParseEventError(trimmed.to_string()))?;
        let id = caps
            .get(3)
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| ParseEventError(trimmed.to_string()))?;
        let element = ElementRef { kind, id };
        match caps.get(1).map(|m| m.as_str()) {
            Some("enter") => Ok(Event::Enter(element)),
            _ => Ok(Event::Click(element)),
        }
    }
}

impl InteractionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_enter(&mut self, layout: &Layout, element: &ElementRef) {
        match layout.focus_for(element) {
            Some(focus) => self.hover = Some(focus),
            None => tracing::warn!(%element, "ignoring hover on unknown element"),
        }
    }

    pub fn on_leave(&mut self) {
        self.hover = None;
    }

    /// Selection is sticky: it only changes when another element is clicked.
    pub fn on_click(&mut self, layout: &Layout, element: &ElementRef) {
        if self.is_selected(element) {
            return;
        }
        match layout.focus_for(element) {
            Some(focus) => self.selected = Some(focus),
            None => tracing::warn!(%element, "ignoring click on unknown element"),
        }
    }

    pub fn zoom_in(&mut self) {
        self.zoom.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.zoom.zoom_out();
    }

    pub fn reset_zoom(&mut self) {
        self.zoom.reset();
    }

    pub fn apply(&mut self, layout: &Layout, event: &Event) {
        tracing::debug!(?event, "applying interaction event");
        match event {
            Event::Enter(element) => self.on_enter(layout, element),
            Event::Leave => self.on_leave(),
            Event::Click(element) => self.on_click(layout, element),
            Event::ZoomIn => self.zoom_in(),
            Event::ZoomOut => self.zoom_out(),
            Event::ZoomReset => self.reset_zoom(),
        }
    }

    pub fn is_hovered(&self, element: &ElementRef) -> bool {
        self.hover.as_ref().is_some_and(|focus| &focus.element == element)
    }

    pub fn is_selected(&self, element: &ElementRef) -> bool {
        self.selected.as_ref().is_some_and(|focus| &focus.element == element)
    }

    /// Hover and selection are independent triggers for the same emphasis.
    pub fn is_active(&self, element: &ElementRef) -> bool {
        self.is_hovered(element) || self.is_selected(element)
    }

    /// Element whose tooltip is shown: the hovered one, else the selection.
    pub fn tooltip(&self) -> Option<&Focus> {
        self.hover.as_ref().or(self.selected.as_ref())
    }

    pub fn active_elements(&self) -> Vec<&ElementRef> {
        let mut active: Vec<&ElementRef> = Vec::new();
        for focus in [&self.hover, &self.selected].into_iter().flatten() {
            if !active.contains(&&focus.element) {
                active.push(&focus.element);
            }
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::default_layout;

    #[test]
    fn zoom_in_clamps_at_max() {
        let mut zoom = Zoom::default();
        for _ in 0..20 {
            zoom.zoom_in();
        }
        assert_eq!(zoom.scale(), 2.5);
    }

    #[test]
    fn zoom_out_clamps_at_min() {
        let mut zoom = Zoom::default();
        for _ in 0..20 {
            zoom.zoom_out();
        }
        assert_eq!(zoom.scale(), 0.6);
    }

    #[test]
    fn reset_returns_to_default() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        zoom.zoom_in();
        zoom.reset();
        assert_eq!(zoom.scale(), 1.0);
        for _ in 0..7 {
            zoom.zoom_out();
        }
        zoom.reset();
        assert_eq!(zoom, Zoom::default());
    }

    #[test]
    fn zoom_steps_by_tenths() {
        let mut zoom = Zoom::default();
        zoom.zoom_in();
        assert_eq!(zoom.scale(), 1.1);
        assert_eq!(zoom.percent(), 110);
        assert_eq!(Zoom::from_scale(9.0).scale(), 2.5);
        assert_eq!(Zoom::from_scale(0.0).scale(), 0.6);
        assert_eq!(Zoom::from_scale(f32::NAN).scale(), 1.0);
        assert_eq!(Zoom::from_scale(1.34).scale(), 1.3);
    }

    #[test]
    fn hover_and_selection_are_independent() {
        let layout = default_layout();
        let a = ElementRef::device("ndc-cpe-1");
        let b = ElementRef::link("extranet-cdc-cpe-2");
        let mut state = InteractionState::new();
        state.on_enter(layout, &a);
        state.on_click(layout, &b);
        assert!(state.is_active(&a));
        assert!(state.is_active(&b));
        assert!(state.hover.is_some() && state.selected.is_some());
        assert!(!state.is_active(&ElementRef::device("cdc-fw")));
    }

    #[test]
    fn selection_survives_pointer_leave() {
        let layout = default_layout();
        let a = ElementRef::device("cdc-fw");
        let mut state = InteractionState::new();
        state.on_enter(layout, &a);
        state.on_click(layout, &a);
        state.on_leave();
        assert!(state.hover.is_none());
        assert!(state.is_selected(&a));
        assert!(state.is_active(&a));

        let b = ElementRef::device("ndc-fw");
        state.on_click(layout, &b);
        assert!(!state.is_active(&a));
        assert!(state.is_selected(&b));
    }

    #[test]
    fn unknown_elements_leave_state_untouched() {
        let layout = default_layout();
        let mut state = InteractionState::new();
        state.on_click(layout, &ElementRef::device("ndc-cpe-1"));
        state.on_enter(layout, &ElementRef::link("missing"));
        state.on_click(layout, &ElementRef::device("missing"));
        assert!(state.hover.is_none());
        assert!(state.is_selected(&ElementRef::device("ndc-cpe-1")));
    }

    #[test]
    fn tooltip_prefers_hover() {
        let layout = default_layout();
        let mut state = InteractionState::new();
        state.on_click(layout, &ElementRef::device("ndc-wan-1"));
        assert_eq!(state.tooltip().unwrap().label, "DHCW WAN-1 (NDC)");
        state.on_enter(layout, &ElementRef::device("ndc-fw"));
        assert_eq!(state.tooltip().unwrap().label, "Check Point Edge FW Cluster (NDC)");
        assert_eq!(state.active_elements().len(), 2);
    }

    #[test]
    fn parses_event_scripts() {
        assert_eq!(
            "enter:device:ndc-cpe-1".parse::<Event>(),
            Ok(Event::Enter(ElementRef::device("ndc-cpe-1")))
        );
        assert_eq!(
            "click:link:extranet-ndc-cpe-2".parse::<Event>(),
            Ok(Event::Click(ElementRef::link("extranet-ndc-cpe-2")))
        );
        assert_eq!(" zoom-in ".parse::<Event>(), Ok(Event::ZoomIn));
        assert_eq!("leave".parse::<Event>(), Ok(Event::Leave));
        assert_eq!("zoom-reset".parse::<Event>(), Ok(Event::ZoomReset));
        assert!("hover:device:x".parse::<Event>().is_err());
        assert!("click:cloud:extranet".parse::<Event>().is_err());
    }

    #[test]
    fn apply_replays_events() {
        let layout = default_layout();
        let mut state = InteractionState::new();
        for raw in ["zoom-in", "zoom-in", "click:device:cdc-cpe-1", "enter:link:ndc-wan-1-fw", "zoom-out"] {
            state.apply(layout, &raw.parse().unwrap());
        }
        assert_eq!(state.zoom.scale(), 1.1);
        assert!(state.is_active(&ElementRef::device("cdc-cpe-1")));
        assert!(state.is_active(&ElementRef::link("ndc-wan-1-fw")));
    }
}
