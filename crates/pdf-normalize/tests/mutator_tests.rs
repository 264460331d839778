use pdf_normalize::*;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    SetBoxSize(f64, f64),
    ScaleContent(f64, f64),
    TranslateContent(i64, i64),
    ScaleBoxAndContent(f64, f64),
    SetRotation(i32),
}

/// Page that records primitive calls instead of touching a PDF
struct RecordingPage {
    page_box: PageBox,
    rotation: i32,
    calls: Vec<Call>,
}

impl RecordingPage {
    fn new(width: f64, height: f64, rotation: i32) -> Self {
        Self {
            page_box: PageBox::new(width, height),
            rotation,
            calls: Vec::new(),
        }
    }
}

impl PagePrimitives for RecordingPage {
    fn page_box(&self) -> Result<PageBox> {
        Ok(self.page_box)
    }

    fn rotation(&self) -> Result<i32> {
        Ok(self.rotation)
    }

    fn set_box_size(&mut self, width: f64, height: f64) -> Result<()> {
        self.calls.push(Call::SetBoxSize(width, height));
        Ok(())
    }

    fn scale_content(&mut self, sx: f64, sy: f64) -> Result<()> {
        self.calls.push(Call::ScaleContent(sx, sy));
        Ok(())
    }

    fn translate_content(&mut self, dx: i64, dy: i64) -> Result<()> {
        self.calls.push(Call::TranslateContent(dx, dy));
        Ok(())
    }

    fn scale_box_and_content(&mut self, sx: f64, sy: f64) -> Result<()> {
        self.calls.push(Call::ScaleBoxAndContent(sx, sy));
        Ok(())
    }

    fn set_rotation(&mut self, degrees: i32) -> Result<()> {
        self.calls.push(Call::SetRotation(degrees));
        Ok(())
    }
}

fn a4() -> TargetSpec {
    PaperSize::A4.target(Orientation::Portrait)
}

#[test]
fn test_fit_center_call_order() {
    let mut page = RecordingPage::new(1000.0, 500.0, 0);
    let plan = normalize_page(&mut page, RotationRequest::Clockwise90, a4()).unwrap();

    assert_eq!(plan.mode, ResizeMode::FitCenter);
    let (s, _) = plan.content_scale;
    assert_eq!(
        page.calls,
        vec![
            Call::SetBoxSize(594.96, 841.92),
            Call::ScaleContent(s, s),
            Call::TranslateContent(0, 272),
            Call::SetRotation(90),
        ]
    );
}

#[test]
fn test_stretch_call_order() {
    let mut page = RecordingPage::new(595.0, 842.0, 90);
    let plan = normalize_page(&mut page, RotationRequest::Clockwise180, a4()).unwrap();

    assert_eq!(plan.mode, ResizeMode::Stretch);
    assert_eq!(
        page.calls,
        vec![
            Call::ScaleBoxAndContent(594.96 / 595.0, 841.92 / 842.0),
            Call::SetRotation(270),
        ]
    );
}

#[test]
fn test_rotation_passed_through_unwrapped() {
    let mut page = RecordingPage::new(595.0, 842.0, 0);
    normalize_page(&mut page, RotationRequest::CounterClockwise90, a4()).unwrap();
    assert_eq!(page.calls.last(), Some(&Call::SetRotation(-90)));
}

#[test]
fn test_degenerate_page_is_not_touched() {
    let mut page = RecordingPage::new(0.0, 842.0, 0);
    let result = normalize_page(&mut page, RotationRequest::Clockwise90, a4());

    assert!(matches!(
        result,
        Err(NormalizeError::DegenerateGeometry { .. })
    ));
    assert!(page.calls.is_empty());
}

#[test]
fn test_apply_plan_directly() {
    let plan = TransformPlan {
        mode: ResizeMode::FitCenter,
        box_size: PageBox::new(100.0, 200.0),
        content_scale: (0.5, 0.5),
        translation: (3, 4),
        final_rotation_degrees: 450,
    };
    let mut page = RecordingPage::new(1.0, 1.0, 0);
    apply_plan(&mut page, &plan).unwrap();

    assert_eq!(
        page.calls,
        vec![
            Call::SetBoxSize(100.0, 200.0),
            Call::ScaleContent(0.5, 0.5),
            Call::TranslateContent(3, 4),
            Call::SetRotation(450),
        ]
    );
}
