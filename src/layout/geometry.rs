#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Axis-aligned box in canvas units; origin top-left, y grows downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn edge_point(&self, side: Side) -> Point {
        edge_point(self, side)
    }

    /// True when `point` lies on one of the four sides (within a small tolerance).
    pub fn on_perimeter(&self, point: Point) -> bool {
        const EPS: f32 = 1e-3;
        let within_x = point.x >= self.x - EPS && point.x <= self.right() + EPS;
        let within_y = point.y >= self.y - EPS && point.y <= self.bottom() + EPS;
        let on_vertical = (point.x - self.x).abs() < EPS || (point.x - self.right()).abs() < EPS;
        let on_horizontal = (point.y - self.y).abs() < EPS || (point.y - self.bottom()).abs() < EPS;
        (on_vertical && within_y) || (on_horizontal && within_x)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
    /// Fallback anchor; resolves to the box center.
    Center,
}

impl Side {
    /// Unrecognised tokens resolve to [`Side::Center`] instead of failing.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::Center => "center",
        }
    }
}

/// Midpoint of the requested side of `rect`.
pub fn edge_point(rect: &Rect, side: Side) -> Point {
    let cx = rect.x + rect.width / 2.0;
    let cy = rect.y + rect.height / 2.0;
    match side {
        Side::Top => Point::new(cx, rect.y),
        Side::Bottom => Point::new(cx, rect.y + rect.height),
        Side::Left => Point::new(rect.x, cy),
        Side::Right => Point::new(rect.x + rect.width, cy),
        Side::Center => Point::new(cx, cy),
    }
}

pub fn bottom_center(rect: &Rect) -> Point {
    edge_point(rect, Side::Bottom)
}

/// Translates a site-relative offset into an absolute box.
pub fn absolute_box(site_origin: Point, dx: f32, dy: f32, size: Size) -> Rect {
    Rect::new(
        site_origin.x + dx,
        site_origin.y + dy,
        size.width,
        size.height,
    )
}

/// Picks the side of each box that faces the other one along the dominant
/// axis of the center-to-center vector. Ties go to the vertical axis.
pub fn facing_sides(from: &Rect, to: &Rect) -> (Side, Side) {
    let a = from.center();
    let b = to.center();
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    if dx.abs() > dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy >= 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_boxes() -> Vec<Rect> {
        vec![
            Rect::new(0.0, 0.0, 200.0, 80.0),
            Rect::new(120.0, 220.0, 200.0, 80.0),
            Rect::new(-40.5, 13.25, 7.0, 3.0),
            Rect::new(850.0, 580.0, 200.0, 90.0),
        ]
    }

    #[test]
    fn vertical_edge_points_sit_on_top_and_bottom() {
        for rect in sample_boxes() {
            let top = edge_point(&rect, Side::Top);
            let bottom = edge_point(&rect, Side::Bottom);
            assert_eq!(top.y, rect.y);
            assert_eq!(bottom.y, rect.y + rect.height);
            assert_eq!(top.x, rect.x + rect.width / 2.0);
            assert_eq!(bottom.x, rect.x + rect.width / 2.0);
        }
    }

    #[test]
    fn horizontal_edge_points_sit_on_left_and_right() {
        for rect in sample_boxes() {
            let left = edge_point(&rect, Side::Left);
            let right = edge_point(&rect, Side::Right);
            assert_eq!(left.x, rect.x);
            assert_eq!(right.x, rect.x + rect.width);
            assert_eq!(left.y, rect.y + rect.height / 2.0);
            assert_eq!(right.y, rect.y + rect.height / 2.0);
        }
    }

    #[test]
    fn edge_points_are_on_perimeter() {
        for rect in sample_boxes() {
            for side in [Side::Top, Side::Bottom, Side::Left, Side::Right] {
                assert!(rect.on_perimeter(edge_point(&rect, side)), "{side:?} of {rect:?}");
            }
            assert!(!rect.on_perimeter(rect.center()));
        }
    }

    #[test]
    fn unknown_side_falls_back_to_center() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(Side::from_token("diagonal"), Side::Center);
        assert_eq!(Side::from_token(" Bottom "), Side::Bottom);
        assert_eq!(edge_point(&rect, Side::from_token("???")), Point::new(60.0, 45.0));
    }

    #[test]
    fn zero_area_box_yields_finite_points() {
        let rect = Rect::new(5.0, 5.0, 0.0, 0.0);
        for side in [Side::Top, Side::Bottom, Side::Left, Side::Right, Side::Center] {
            let p = edge_point(&rect, side);
            assert!(p.x.is_finite() && p.y.is_finite());
        }
    }

    #[test]
    fn absolute_box_translates_offsets() {
        let rect = absolute_box(Point::new(120.0, 220.0), 260.0, 170.0, Size::new(200.0, 80.0));
        assert_eq!(rect, Rect::new(380.0, 390.0, 200.0, 80.0));
    }

    #[test]
    fn bottom_center_matches_bottom_edge() {
        let rect = Rect::new(450.0, 48.0, 272.0, 120.0);
        assert_eq!(bottom_center(&rect), Point::new(586.0, 168.0));
        assert_eq!(bottom_center(&rect), edge_point(&rect, Side::Bottom));
    }

    #[test]
    fn facing_sides_follow_dominant_axis() {
        let upper = Rect::new(0.0, 0.0, 200.0, 80.0);
        let lower = Rect::new(0.0, 170.0, 200.0, 80.0);
        let beside = Rect::new(260.0, 0.0, 200.0, 80.0);
        assert_eq!(facing_sides(&upper, &lower), (Side::Bottom, Side::Top));
        assert_eq!(facing_sides(&lower, &upper), (Side::Top, Side::Bottom));
        assert_eq!(facing_sides(&upper, &beside), (Side::Right, Side::Left));
        assert_eq!(facing_sides(&beside, &upper), (Side::Left, Side::Right));

        // Equal offsets on both axes stack vertically.
        let diagonal = Rect::new(100.0, 100.0, 200.0, 80.0);
        assert_eq!(facing_sides(&upper, &diagonal), (Side::Bottom, Side::Top));
    }
}
