use crate::file_selection::SelectedImage;

pub const PREVIEW_ALT_TEXT: &str = "preview";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewView {
    pub src: String,
    pub alt: &'static str,
}

pub fn render_preview(image: Option<&SelectedImage>) -> Option<PreviewView> {
    let src = image?.preview_data.as_ref()?;
    Some(PreviewView {
        src: src.clone(),
        alt: PREVIEW_ALT_TEXT,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(preview: Option<&str>) -> SelectedImage {
        SelectedImage {
            file_name: "test.png".to_string(),
            mime_type: "image/png".to_string(),
            raw_bytes: b"dummy content".to_vec(),
            preview_data: preview.map(str::to_string),
        }
    }

    #[test]
    fn renders_nothing_without_image() {
        assert_eq!(render_preview(None), None);
        assert_eq!(render_preview(Some(&image(None))), None);
    }

    #[test]
    fn preview_source_is_the_data_url() {
        let selected = image(Some("data:image/png;base64,dummybase64"));
        let first = render_preview(Some(&selected)).expect("preview");
        assert_eq!(first.src, "data:image/png;base64,dummybase64");
        assert_eq!(first.alt, "preview");
        assert_eq!(render_preview(Some(&selected)), Some(first));
    }
}
