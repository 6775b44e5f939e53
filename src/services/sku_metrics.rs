//! Derived packing figures of a SKU.
//!
//! Every figure is stored with an `*_auto` marker. A caller-supplied value is
//! a manual override and clears the marker; figures whose marker is still set
//! are recomputed from the dimensions whenever the SKU is saved. Missing or
//! non-positive inputs leave a figure as it was.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{sku, storage_unit};

const MM3_PER_M3: i64 = 1_000_000_000;
const MM2_PER_M2: i64 = 1_000_000;

/// Handling unit (case) dimensions in millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandlingUnit {
    pub length_mm: Option<Decimal>,
    pub width_mm: Option<Decimal>,
    pub height_mm: Option<Decimal>,
}

/// Storage unit (pallet) footprint and maximum stack height in millimetres
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StorageFootprint {
    pub length_mm: Option<Decimal>,
    pub width_mm: Option<Decimal>,
    pub height_mm: Option<Decimal>,
}

impl From<&sku::Model> for HandlingUnit {
    fn from(sku: &sku::Model) -> Self {
        Self {
            length_mm: sku.length_per_hu_mm,
            width_mm: sku.width_per_hu_mm,
            height_mm: sku.height_per_hu_mm,
        }
    }
}

impl From<&storage_unit::Model> for StorageFootprint {
    fn from(unit: &storage_unit::Model) -> Self {
        Self {
            length_mm: unit.length_per_su_mm,
            width_mm: unit.width_per_su_mm,
            height_mm: unit.height_per_su_mm,
        }
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// L×W×H in mm³ as m³
pub fn cubic_metres(hu: &HandlingUnit) -> Option<Decimal> {
    let volume = positive(hu.length_mm)?
        .checked_mul(positive(hu.width_mm)?)?
        .checked_mul(positive(hu.height_mm)?)?;
    Some((volume / Decimal::from(MM3_PER_M3)).normalize())
}

/// Pallet footprint L×W in mm² as m²
pub fn square_metres(su: &StorageFootprint) -> Option<Decimal> {
    let area = positive(su.length_mm)?.checked_mul(positive(su.width_mm)?)?;
    Some((area / Decimal::from(MM2_PER_M2)).normalize())
}

/// Whole cases that fit on one pallet layer, by footprint area
pub fn cases_per_layer(hu: &HandlingUnit, su: &StorageFootprint) -> Option<i32> {
    let pallet = positive(su.length_mm)?.checked_mul(positive(su.width_mm)?)?;
    let case = positive(hu.length_mm)?.checked_mul(positive(hu.width_mm)?)?;
    pallet.checked_div(case)?.floor().to_i32()
}

/// Whole layers that fit under the pallet's stack height
pub fn layers_per_pallet(hu: &HandlingUnit, su: &StorageFootprint) -> Option<i32> {
    positive(su.height_mm)?
        .checked_div(positive(hu.height_mm)?)?
        .floor()
        .to_i32()
}

/// A stored figure and its auto marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Derived<T> {
    pub value: Option<T>,
    pub auto: bool,
}

impl<T: Copy> Derived<T> {
    fn automatic() -> Self {
        Self {
            value: None,
            auto: true,
        }
    }

    fn apply(&mut self, manual: Option<T>, computed: impl FnOnce() -> Option<T>) {
        if let Some(value) = manual {
            self.value = Some(value);
            self.auto = false;
        } else if self.auto {
            if let Some(value) = computed() {
                self.value = Some(value);
            }
        }
    }
}

/// Values a caller supplied explicitly in a create or update request
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ManualFigures {
    pub expected_cubic_per_hu: Option<Decimal>,
    pub sqm_per_su: Option<Decimal>,
    pub cases_per_layer: Option<i32>,
    pub layers_per_pallet: Option<i32>,
    pub cases_per_pallet: Option<i32>,
}

/// The five derived figures of a SKU
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuMetrics {
    pub expected_cubic_per_hu: Derived<Decimal>,
    pub sqm_per_su: Derived<Decimal>,
    pub cases_per_layer: Derived<i32>,
    pub layers_per_pallet: Derived<i32>,
    pub cases_per_pallet: Derived<i32>,
}

impl Default for SkuMetrics {
    /// A new SKU: nothing computed yet, every figure automatic
    fn default() -> Self {
        Self {
            expected_cubic_per_hu: Derived::automatic(),
            sqm_per_su: Derived::automatic(),
            cases_per_layer: Derived::automatic(),
            layers_per_pallet: Derived::automatic(),
            cases_per_pallet: Derived::automatic(),
        }
    }
}

impl From<&sku::Model> for SkuMetrics {
    fn from(sku: &sku::Model) -> Self {
        Self {
            expected_cubic_per_hu: Derived {
                value: sku.expected_cubic_per_hu,
                auto: sku.expected_cubic_per_hu_auto,
            },
            sqm_per_su: Derived {
                value: sku.sqm_per_su,
                auto: sku.sqm_per_su_auto,
            },
            cases_per_layer: Derived {
                value: sku.cases_per_layer,
                auto: sku.cases_per_layer_auto,
            },
            layers_per_pallet: Derived {
                value: sku.layers_per_pallet,
                auto: sku.layers_per_pallet_auto,
            },
            cases_per_pallet: Derived {
                value: sku.cases_per_pallet,
                auto: sku.cases_per_pallet_auto,
            },
        }
    }
}

impl SkuMetrics {
    /// Marks every figure automatic again
    pub fn reset_markers(&mut self) {
        self.expected_cubic_per_hu.auto = true;
        self.sqm_per_su.auto = true;
        self.cases_per_layer.auto = true;
        self.layers_per_pallet.auto = true;
        self.cases_per_pallet.auto = true;
    }

    /// Applies manual overrides, then recomputes the automatic figures.
    ///
    /// With `auto_calculate` every marker is reset first and `manual` is
    /// ignored. Cases per pallet multiplies the resolved layer figures, so a
    /// manual cases-per-layer still feeds an automatic cases-per-pallet.
    pub fn recalculate(
        mut self,
        manual: &ManualFigures,
        auto_calculate: bool,
        hu: &HandlingUnit,
        su: Option<&StorageFootprint>,
    ) -> Self {
        let none = ManualFigures::default();
        let manual = if auto_calculate {
            self.reset_markers();
            &none
        } else {
            manual
        };

        self.expected_cubic_per_hu
            .apply(manual.expected_cubic_per_hu, || cubic_metres(hu));
        self.sqm_per_su
            .apply(manual.sqm_per_su, || su.and_then(square_metres));
        self.cases_per_layer
            .apply(manual.cases_per_layer, || su.and_then(|su| cases_per_layer(hu, su)));
        self.layers_per_pallet
            .apply(manual.layers_per_pallet, || {
                su.and_then(|su| layers_per_pallet(hu, su))
            });

        let per_layer = self.cases_per_layer.value.filter(|v| *v > 0);
        let layers = self.layers_per_pallet.value.filter(|v| *v > 0);
        self.cases_per_pallet.apply(manual.cases_per_pallet, || {
            per_layer?.checked_mul(layers?)
        });

        self
    }

    pub fn write_to(&self, model: &mut sku::ActiveModel) {
        model.expected_cubic_per_hu = Set(self.expected_cubic_per_hu.value);
        model.expected_cubic_per_hu_auto = Set(self.expected_cubic_per_hu.auto);
        model.sqm_per_su = Set(self.sqm_per_su.value);
        model.sqm_per_su_auto = Set(self.sqm_per_su.auto);
        model.cases_per_layer = Set(self.cases_per_layer.value);
        model.cases_per_layer_auto = Set(self.cases_per_layer.auto);
        model.layers_per_pallet = Set(self.layers_per_pallet.value);
        model.layers_per_pallet_auto = Set(self.layers_per_pallet.auto);
        model.cases_per_pallet = Set(self.cases_per_pallet.value);
        model.cases_per_pallet_auto = Set(self.cases_per_pallet.auto);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn case(l: Decimal, w: Decimal, h: Decimal) -> HandlingUnit {
        HandlingUnit {
            length_mm: Some(l),
            width_mm: Some(w),
            height_mm: Some(h),
        }
    }

    fn pallet() -> StorageFootprint {
        StorageFootprint {
            length_mm: Some(dec!(1200)),
            width_mm: Some(dec!(1000)),
            height_mm: Some(dec!(1500)),
        }
    }

    #[test]
    fn one_metre_cube() {
        let hu = case(dec!(1000), dec!(1000), dec!(1000));
        assert_eq!(cubic_metres(&hu), Some(dec!(1.0)));
    }

    #[test]
    fn standard_pallet_footprint() {
        assert_eq!(square_metres(&pallet()), Some(dec!(1.2)));
    }

    #[test]
    fn layer_figures_use_floor_division() {
        let hu = case(dec!(400), dec!(300), dec!(400));
        // 1_200_000 / 120_000 = 10
        assert_eq!(cases_per_layer(&hu, &pallet()), Some(10));
        // 1500 / 400 = 3.75
        assert_eq!(layers_per_pallet(&hu, &pallet()), Some(3));

        let odd = case(dec!(410), dec!(310), dec!(400));
        // 1_200_000 / 127_100 = 9.44
        assert_eq!(cases_per_layer(&odd, &pallet()), Some(9));
    }

    #[test]
    fn missing_or_zero_inputs_compute_nothing() {
        let mut hu = case(dec!(1000), dec!(1000), dec!(0));
        assert_eq!(cubic_metres(&hu), None);
        hu.height_mm = None;
        assert_eq!(cubic_metres(&hu), None);
        assert_eq!(layers_per_pallet(&hu, &pallet()), None);
        assert_eq!(square_metres(&StorageFootprint::default()), None);
    }

    #[test]
    fn overflowing_ratios_compute_nothing() {
        let tiny = case(dec!(0.5), dec!(1), dec!(0.5));
        let huge = StorageFootprint {
            length_mm: Some(Decimal::MAX),
            width_mm: Some(dec!(1)),
            height_mm: Some(Decimal::MAX),
        };
        assert_eq!(cases_per_layer(&tiny, &huge), None);
        assert_eq!(layers_per_pallet(&tiny, &huge), None);

        let metrics = SkuMetrics::default().recalculate(&ManualFigures::default(), false, &tiny, Some(&huge));
        assert_eq!(metrics.cases_per_layer.value, None);
        assert_eq!(metrics.cases_per_pallet.value, None);
    }

    #[test]
    fn new_sku_gets_every_figure() {
        let hu = case(dec!(400), dec!(300), dec!(400));
        let metrics =
            SkuMetrics::default().recalculate(&ManualFigures::default(), false, &hu, Some(&pallet()));

        assert_eq!(metrics.expected_cubic_per_hu.value, Some(dec!(0.048)));
        assert_eq!(metrics.sqm_per_su.value, Some(dec!(1.2)));
        assert_eq!(metrics.cases_per_layer.value, Some(10));
        assert_eq!(metrics.layers_per_pallet.value, Some(3));
        assert_eq!(metrics.cases_per_pallet.value, Some(30));
        assert!(metrics.cases_per_pallet.auto);
    }

    #[test]
    fn manual_value_survives_later_saves() {
        let hu = case(dec!(400), dec!(300), dec!(400));
        let manual = ManualFigures {
            cases_per_layer: Some(8),
            ..Default::default()
        };
        let first = SkuMetrics::default().recalculate(&manual, false, &hu, Some(&pallet()));
        assert_eq!(first.cases_per_layer, Derived { value: Some(8), auto: false });
        assert_eq!(first.cases_per_pallet.value, Some(24));

        // a later save with new dimensions keeps the override
        let bigger = case(dec!(200), dec!(200), dec!(500));
        let second = first.recalculate(&ManualFigures::default(), false, &bigger, Some(&pallet()));
        assert_eq!(second.cases_per_layer.value, Some(8));
        assert_eq!(second.layers_per_pallet.value, Some(3));
        assert_eq!(second.cases_per_pallet.value, Some(24));
        assert_eq!(second.expected_cubic_per_hu.value, Some(dec!(0.02)));
    }

    #[test]
    fn auto_calculate_resets_overrides() {
        let hu = case(dec!(400), dec!(300), dec!(400));
        let manual = ManualFigures {
            cases_per_layer: Some(8),
            cases_per_pallet: Some(99),
            ..Default::default()
        };
        let overridden = SkuMetrics::default().recalculate(&manual, false, &hu, Some(&pallet()));
        let reset = overridden.recalculate(&manual, true, &hu, Some(&pallet()));

        assert_eq!(reset.cases_per_layer, Derived { value: Some(10), auto: true });
        assert_eq!(reset.cases_per_pallet, Derived { value: Some(30), auto: true });
    }

    #[test]
    fn without_storage_unit_pallet_figures_stay_untouched() {
        let hu = case(dec!(400), dec!(300), dec!(400));
        let mut metrics = SkuMetrics::default();
        metrics.sqm_per_su.value = Some(dec!(0.96));

        let metrics = metrics.recalculate(&ManualFigures::default(), false, &hu, None);

        assert_eq!(metrics.sqm_per_su.value, Some(dec!(0.96)));
        assert_eq!(metrics.cases_per_layer.value, None);
        assert_eq!(metrics.cases_per_pallet.value, None);
        assert_eq!(metrics.expected_cubic_per_hu.value, Some(dec!(0.048)));
    }
}
