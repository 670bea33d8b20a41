//! Clipping road line strings to square bounds.
//!
//! geo answers whether a road touches a rectangle, but not which part of it
//! lies inside, so the cut itself is a parametric (Liang–Barsky) clipper over
//! geo's `Line` and `Rect`.

use geo::{Coord, Line, LineString, Rect};

/// Parts of `line` inside `rect`, each a line string of at least two points.
///
/// Segments are clipped individually and consecutive inside pieces that share
/// an endpoint are merged back into one line string.
pub fn clip_line_string(line: &LineString<f64>, rect: &Rect<f64>) -> Vec<LineString<f64>> {
    let mut pieces: Vec<LineString<f64>> = Vec::new();
    let mut current: Vec<Coord<f64>> = Vec::new();

    for segment in line.lines() {
        match clip_line(segment, rect) {
            Some(inside) => {
                if current.last() != Some(&inside.start) {
                    flush(&mut pieces, &mut current);
                    current.push(inside.start);
                }
                if inside.end != inside.start {
                    current.push(inside.end);
                }
            }
            None => flush(&mut pieces, &mut current),
        }
    }
    flush(&mut pieces, &mut current);
    pieces
}

fn flush(pieces: &mut Vec<LineString<f64>>, current: &mut Vec<Coord<f64>>) {
    if current.len() >= 2 {
        pieces.push(LineString::new(std::mem::take(current)));
    } else {
        current.clear();
    }
}

/// Portion of `segment` inside `rect`, or `None` when it misses the rectangle.
pub fn clip_line(segment: Line<f64>, rect: &Rect<f64>) -> Option<Line<f64>> {
    let (a, b) = (segment.start, segment.end);
    let delta = segment.delta();
    let (min, max) = (rect.min(), rect.max());
    let mut t0 = 0.0_f64;
    let mut t1 = 1.0_f64;

    let edges = [
        (-delta.x, a.x - min.x),
        (delta.x, max.x - a.x),
        (-delta.y, a.y - min.y),
        (delta.y, max.y - a.y),
    ];

    for (p, q) in edges {
        if p == 0.0 {
            // Parallel to this edge; reject when fully outside it
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }

    let at = |t: f64| a + delta * t;
    let start = if t0 == 0.0 { a } else { at(t0) };
    let end = if t1 == 1.0 { b } else { at(t1) };
    Some(Line::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{coord, line_string, Intersects};

    fn unit() -> Rect<f64> {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 1.0, y: 1.0 })
    }

    #[test]
    fn segment_crossing_square_is_trimmed_to_edges() {
        let segment = Line::new(coord! { x: -1.0, y: 0.5 }, coord! { x: 2.0, y: 0.5 });
        let inside = clip_line(segment, &unit()).unwrap();
        assert!((inside.start.x - 0.0).abs() < 1e-12);
        assert!((inside.end.x - 1.0).abs() < 1e-12);
        assert!((inside.start.y - 0.5).abs() < 1e-12);
    }

    #[test]
    fn segment_outside_is_rejected() {
        let above = Line::new(coord! { x: -1.0, y: 2.0 }, coord! { x: 2.0, y: 2.0 });
        let past_corner = Line::new(coord! { x: 2.0, y: -0.5 }, coord! { x: 5.0, y: 2.0 });
        assert!(clip_line(above, &unit()).is_none());
        assert!(clip_line(past_corner, &unit()).is_none());
    }

    #[test]
    fn inside_line_stays_one_piece() {
        let line = line_string![(x: 0.1, y: 0.1), (x: 0.2, y: 0.5), (x: 0.8, y: 0.9)];
        let pieces = clip_line_string(&line, &unit());
        assert_eq!(pieces, vec![line]);
    }

    #[test]
    fn line_leaving_and_reentering_splits() {
        let line = line_string![(x: 0.2, y: 0.5), (x: 0.4, y: 1.5), (x: 0.6, y: 0.5)];
        let pieces = clip_line_string(&line, &unit());
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].0[0], coord! { x: 0.2, y: 0.5 });
        assert!((pieces[0].0[1].y - 1.0).abs() < 1e-12);
        assert!((pieces[1].0[0].y - 1.0).abs() < 1e-12);
        assert_eq!(pieces[1].0[1], coord! { x: 0.6, y: 0.5 });
    }

    #[test]
    fn corner_touch_yields_no_piece() {
        let line = line_string![(x: 1.0, y: 1.0), (x: 2.0, y: 2.0)];
        assert!(clip_line_string(&line, &unit()).is_empty());
        assert!(line.intersects(&unit()));
    }
}
