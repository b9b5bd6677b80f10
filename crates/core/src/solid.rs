//! A constant-color fill layer.

use crate::color::{blend, BlendMethod, Color};
use crate::context::Context;
use crate::error::LayerError;
use crate::geometry::Point;
use crate::layer::{Hit, Layer};
use crate::param::{ParamDesc, ParamEntry, ParamTable, ParamType, ParamValue};
use crate::progress::{ProgressCallback, SubProgress};
use crate::surface::{RendDesc, Surface};

/// Fills the plane with one color, blended over the layers below.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidColor {
    color: Color,
    amount: f64,
    blend_method: BlendMethod,
}

static PARAMS: ParamTable<SolidColor> = ParamTable::new(&[
    ParamEntry {
        desc: ParamDesc::new("color", "Color", "Fill color", ParamType::Color),
        get: |l| ParamValue::Color(l.color),
        set: |l, v| {
            let c = v.as_color().ok_or("expected a color")?;
            if !c.is_finite() {
                return Err("color components must be finite".to_string());
            }
            l.color = c;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new("amount", "Amount", "Opacity of the fill", ParamType::Real),
        get: |l| ParamValue::Real(l.amount),
        set: |l, v| {
            let amount = v.as_real().ok_or("expected a real")?;
            if !amount.is_finite() {
                return Err("amount must be finite".to_string());
            }
            l.amount = amount;
            Ok(())
        },
    },
    ParamEntry {
        desc: ParamDesc::new(
            "blend_method",
            "Blend Method",
            "How the fill combines with the layers below",
            ParamType::Enum,
        )
        .with_enum_values(BlendMethod::NAMES),
        get: |l| ParamValue::Enum(l.blend_method.name().to_string()),
        set: |l, v| {
            l.blend_method = v.as_enum().unwrap_or_default().parse::<BlendMethod>()?;
            Ok(())
        },
    },
]);

impl SolidColor {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            amount: 1.0,
            blend_method: BlendMethod::Composite,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Returns `InvalidParamValue` for non-finite amounts.
    pub fn set_amount(&mut self, amount: f64) -> Result<(), LayerError> {
        if !amount.is_finite() {
            return Err(LayerError::InvalidParamValue {
                name: "amount".to_string(),
                reason: "amount must be finite".to_string(),
            });
        }
        self.amount = amount;
        Ok(())
    }

    pub fn set_blend_method(&mut self, method: BlendMethod) {
        self.blend_method = method;
    }

    fn is_solid(&self) -> bool {
        self.amount == 1.0 && self.blend_method == BlendMethod::Straight
    }
}

impl Default for SolidColor {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl Layer for SolidColor {
    fn name(&self) -> &'static str {
        "solid_color"
    }

    fn param_vocab(&self) -> Vec<ParamDesc> {
        PARAMS.descs()
    }

    fn get_param(&self, key: &str) -> Result<ParamValue, LayerError> {
        PARAMS.get(self, key)
    }

    fn set_param(&mut self, key: &str, value: ParamValue) -> Result<(), LayerError> {
        PARAMS.set(self, key, value)
    }

    fn get_color(&self, context: Context<'_>, pos: Point) -> Color {
        if self.is_solid() {
            return self.color;
        }
        blend(
            self.color,
            context.get_color(pos),
            self.amount,
            self.blend_method,
        )
    }

    fn accelerated_render(
        &self,
        context: Context<'_>,
        surface: &mut Surface,
        quality: i32,
        desc: &RendDesc,
        progress: &mut dyn ProgressCallback,
    ) -> Result<(), LayerError> {
        if self.is_solid() {
            surface.set_wh(desc.width(), desc.height())?;
            surface.fill(self.color);
        } else {
            let mut sub = SubProgress::new(progress, 0, 9500, 10000);
            context.accelerated_render(surface, quality, desc, &mut sub)?;
            if self.amount == 0.0 {
                return Ok(());
            }
            for px in surface.data_mut() {
                *px = blend(self.color, *px, self.amount, self.blend_method);
            }
        }
        if !progress.amount_complete(10000, 10000) {
            return Err(LayerError::Cancelled);
        }
        Ok(())
    }

    fn hit_check(&self, context: Context<'_>, pos: Point) -> Option<Hit> {
        if self.amount != 0.0 && self.color.a * self.amount.abs() > 0.5 {
            return Some(Hit::This);
        }
        context.hit_check(pos).map(Hit::Below)
    }
}
