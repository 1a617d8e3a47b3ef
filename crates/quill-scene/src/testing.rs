//! Backend-independent test double that records every paint operation.

use quill_core::{
    DrawTarget, DrawingContext, GraphicsState, LineCap, LineJoin, Path, Result, Source,
    TextExtents, Transform2D,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PaintOp {
    Fill,
    Stroke,
}

#[derive(Clone, Debug)]
pub struct Painted {
    pub op: PaintOp,
    pub path: Path,
    pub matrix: Transform2D,
    pub source: Source,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
}

impl Painted {
    /// Path vertices mapped to device space.
    pub fn device_vertices(&self) -> Vec<[f64; 2]> {
        self.path.transformed(&self.matrix).vertices()
    }
}

#[derive(Default)]
pub struct RecordingTarget {
    pub ops: Vec<Painted>,
    pub contexts_opened: usize,
}

impl RecordingTarget {
    pub fn fills(&self) -> Vec<&Painted> {
        self.ops.iter().filter(|p| p.op == PaintOp::Fill).collect()
    }

    pub fn strokes(&self) -> Vec<&Painted> {
        self.ops.iter().filter(|p| p.op == PaintOp::Stroke).collect()
    }
}

impl DrawTarget for RecordingTarget {
    fn size(&self) -> (u32, u32) {
        (100, 100)
    }

    fn new_context(&mut self) -> Result<Box<dyn DrawingContext + '_>> {
        self.contexts_opened += 1;
        Ok(Box::new(RecordingContext {
            state: GraphicsState::default(),
            ops: &mut self.ops,
        }))
    }
}

pub struct RecordingContext<'a> {
    state: GraphicsState,
    ops: &'a mut Vec<Painted>,
}

impl RecordingContext<'_> {
    fn record(&mut self, op: PaintOp) {
        let s = &self.state;
        self.ops.push(Painted {
            op,
            path: s.path.path().clone(),
            matrix: s.matrix,
            source: s.source.clone(),
            line_width: s.line_width,
            line_cap: s.line_cap,
            line_join: s.line_join,
        });
    }
}

/// Fixed metrics: every character is a `0.5 x 0.7` em box sitting on the baseline.
pub fn fake_extents(text: &str, size: f64) -> TextExtents {
    let n = text.chars().count() as f64;
    TextExtents {
        x_bearing: 0.0,
        y_bearing: -0.7 * size,
        width: 0.5 * size * n,
        height: 0.7 * size,
        x_advance: 0.5 * size * n,
        y_advance: 0.0,
    }
}

impl DrawingContext for RecordingContext<'_> {
    fn state(&self) -> &GraphicsState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut GraphicsState {
        &mut self.state
    }

    fn fill_preserve(&mut self) -> Result<()> {
        self.record(PaintOp::Fill);
        Ok(())
    }

    fn stroke_preserve(&mut self) -> Result<()> {
        self.record(PaintOp::Stroke);
        Ok(())
    }

    fn text_extents(&mut self, text: &str) -> Result<TextExtents> {
        Ok(fake_extents(text, self.state.font_size))
    }

    fn text_path(&mut self, text: &str) -> Result<()> {
        let [x, y] = self.current_point().unwrap_or([0.0, 0.0]);
        let ext = fake_extents(text, self.state.font_size);
        self.rectangle(x + ext.x_bearing, y + ext.y_bearing, ext.width, ext.height);
        Ok(())
    }
}
