use log::trace;

use crate::api::NarrowphaseApi;
use crate::narrowphase::Narrowphase;
use crate::pixel::{self, MaskView};
use crate::types::*;

/// One side of a query: its shape in world space plus what the pixel-mask
/// and rectangle cases need to know about the owner.
#[derive(Copy, Clone, Debug)]
pub struct Participant<'a> {
    pub shape: Shape,
    /// Current raster frame; only consulted when `shape` is `PixelMask`.
    pub image: Option<MaskView<'a>>,
    pub rotatable: bool,
}

impl<'a> Participant<'a> {
    pub fn new(shape: Shape, image: Option<MaskView<'a>>, rotatable: bool) -> Self {
        Self { shape, image, rotatable }
    }

    /// Participant without a raster frame (tiles, probe shapes).
    pub fn fixed(shape: Shape) -> Self {
        Self { shape, image: None, rotatable: false }
    }
}

/// Dispatch matrix: picks the kernel predicate for the pair of active kinds.
pub fn query(a: &Participant, b: &Participant, cfg: &EngineConfig) -> bool {
    use Shape::*;

    match (&a.shape, &b.shape) {
        (None, _) | (_, None) => false,

        (Rectangle(r1), Rectangle(r2)) => {
            if cfg.circumradius_reject {
                let reach = r1.circumradius() + r2.circumradius();
                if (r1.center() - r2.center()).length_squared() > reach * reach {
                    return false;
                }
            }
            Narrowphase::rect_rect(r1, r2)
        }
        (Rectangle(r), Circle(c)) => circle_vs_rect(c, r, a.rotatable),
        (Circle(c), Rectangle(r)) => circle_vs_rect(c, r, b.rotatable),
        (Rectangle(r), Line(l)) | (Line(l), Rectangle(r)) => Narrowphase::rect_line(r, l),
        (Rectangle(r), Spot(p)) => Narrowphase::point_in_rect(*p, r, a.rotatable),
        (Spot(p), Rectangle(r)) => Narrowphase::point_in_rect(*p, r, b.rotatable),

        (Circle(c1), Circle(c2)) => Narrowphase::circle_circle(c1, c2),
        (Circle(c), Line(l)) | (Line(l), Circle(c)) => Narrowphase::circle_line(c, l),
        (Circle(c), Spot(p)) | (Spot(p), Circle(c)) => Narrowphase::point_in_circle(*p, c),

        (Line(l1), Line(l2)) => Narrowphase::line_line(l1, l2),
        (Line(l), Spot(p)) | (Spot(p), Line(l)) => Narrowphase::point_on_line(*p, l, cfg.spot_epsilon),

        (Spot(p1), Spot(p2)) => Narrowphase::circle_circle(
            &crate::types::Circle::new(*p1, cfg.spot_radius),
            &crate::types::Circle::new(*p2, cfg.spot_radius),
        ),

        (Circle(c), PixelMask) => b.image.is_some_and(|v| pixel::circle_hits_mask(c, &v)),
        (PixelMask, Circle(c)) => a.image.is_some_and(|v| pixel::circle_hits_mask(c, &v)),
        (Line(l), PixelMask) => b.image.is_some_and(|v| pixel::line_hits_mask(l, &v)),
        (PixelMask, Line(l)) => a.image.is_some_and(|v| pixel::line_hits_mask(l, &v)),
        (Spot(p), PixelMask) => b.image.is_some_and(|v| pixel::spot_hits_mask(*p, &v)),
        (PixelMask, Spot(p)) => a.image.is_some_and(|v| pixel::spot_hits_mask(*p, &v)),

        (Rectangle(_), PixelMask) | (PixelMask, Rectangle(_)) | (PixelMask, PixelMask) => {
            trace!("unsupported pair {:?} vs {:?}", a.shape.kind(), b.shape.kind());
            false
        }
    }
}

// A non-rotatable owner keeps its rectangle axis-parallel.
fn circle_vs_rect(c: &Circle, r: &Rectangle, rotatable: bool) -> bool {
    if rotatable {
        Narrowphase::circle_rect(c, r)
    } else {
        let (min, max) = r.bounds();
        Narrowphase::circle_aabb(c, min, max)
    }
}
