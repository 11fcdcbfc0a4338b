//! Human Development Index colouring for the world map.

use std::collections::BTreeSet;

use lifespan_types::{CountryShape, Fill, LegendStop, MapCountry, MapModel};

use crate::views::extent;

/// `[min, max]` HDI of `year` across all shapes, zeros included.
pub fn hdi_extent(shapes: &[CountryShape], year: i32) -> Option<(f64, f64)> {
    extent(shapes.iter().map(|s| s.hdi_for(year)))
}

/// Fill for one HDI value; zero or less is the no-data sentinel.
pub fn fill_for(value: f64, extent: (f64, f64)) -> Fill {
    if value <= 0.0 {
        return Fill::NoData;
    }
    let (lo, hi) = extent;
    let width = hi - lo;
    if width > 0.0 {
        Fill::Scaled(((value - lo) / width).clamp(0.0, 1.0))
    } else {
        Fill::Scaled(0.0)
    }
}

/// Two-stop gradient legend, values rounded to one decimal.
pub fn legend(extent: Option<(f64, f64)>) -> Vec<LegendStop> {
    let round = |v: f64| (v * 10.0).round() / 10.0;
    extent.map_or_else(Vec::new, |(lo, hi)| {
        vec![
            LegendStop {
                value: round(lo),
                offset: 0,
            },
            LegendStop {
                value: round(hi),
                offset: 100,
            },
        ]
    })
}

/// Map model for `year`, flagging shapes named in `selected`.
pub fn map_model(shapes: &[CountryShape], year: i32, selected: &BTreeSet<String>) -> MapModel {
    let extent = hdi_extent(shapes, year);
    let countries = shapes
        .iter()
        .map(|shape| {
            let hdi = shape.hdi_for(year);
            MapCountry {
                name: shape.name.clone(),
                hdi,
                fill: extent.map_or(Fill::NoData, |e| fill_for(hdi, e)),
                selected: selected.contains(&shape.name),
            }
        })
        .collect();

    MapModel {
        year,
        extent,
        countries,
        legend: legend(extent),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn shape(name: &str, values: &[(i32, f64)]) -> CountryShape {
        CountryShape {
            name: name.to_owned(),
            hdi: values.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    #[test]
    fn extent_counts_zeros() {
        let shapes = [
            shape("A", &[(2010, 0.8)]),
            shape("B", &[(2010, 0.45)]),
            shape("C", &[]),
        ];
        assert_eq!(hdi_extent(&shapes, 2010), Some((0.0, 0.8)));
        assert_eq!(hdi_extent(&[], 2010), None);
    }

    #[test]
    fn zero_hdi_has_no_data_fill() {
        let shapes = [shape("A", &[(2010, 0.8)]), shape("B", &[(2010, 0.4)]), shape("C", &[])];
        let model = map_model(&shapes, 2010, &BTreeSet::new());
        assert_eq!(model.countries[2].fill, Fill::NoData);
        assert_eq!(model.countries[0].fill, Fill::Scaled(1.0));
        assert_eq!(model.countries[1].fill, Fill::Scaled(0.5));
    }

    #[test]
    fn degenerate_extent_scales_to_zero() {
        assert_eq!(fill_for(0.7, (0.7, 0.7)), Fill::Scaled(0.0));
    }

    #[test]
    fn selection_is_flagged() {
        let shapes = [shape("Peru", &[(2005, 0.7)]), shape("Chad", &[(2005, 0.3)])];
        let selected: BTreeSet<String> = std::iter::once("Chad".to_owned()).collect();
        let model = map_model(&shapes, 2005, &selected);
        assert!(!model.countries[0].selected);
        assert!(model.countries[1].selected);
    }

    #[test]
    fn legend_rounds_to_one_decimal() {
        let stops = legend(Some((0.349, 0.951)));
        assert_eq!(stops.len(), 2);
        assert!((stops[0].value - 0.3).abs() < 1e-12);
        assert_eq!(stops[0].offset, 0);
        assert!((stops[1].value - 1.0).abs() < 1e-12);
        assert_eq!(stops[1].offset, 100);
    }
}
