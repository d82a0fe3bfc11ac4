//! XML response envelope.

use quick_xml::escape::escape;

pub const CONTENT_TYPE: &str = "text/xml";

const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Wrap `text` in `<Response><Message>…</Message></Response>`.
pub fn render(text: &str) -> String {
    format!(
        "{}\n<Response><Message>{}</Message></Response>",
        DECLARATION,
        escape(text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_envelope() {
        assert_eq!(
            render("Please provide an email"),
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response><Message>Please provide an email</Message></Response>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert!(render("a<b> & \"c\" 'd'")
            .contains("<Message>a&lt;b&gt; &amp; &quot;c&quot; &apos;d&apos;</Message>"));
    }

    #[test]
    fn test_envelope_round_trips_through_reader() {
        use quick_xml::events::Event;
        use quick_xml::Reader;

        let text = "Email likely invalid. Consider using <bob>@gmail.com & co";
        let xml = render(text);
        let mut reader = Reader::from_str(&xml);

        let mut elements = Vec::new();
        let mut message = None;
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) => {
                    elements.push(String::from_utf8(e.name().as_ref().to_vec()).unwrap())
                }
                Event::Text(e) if elements.last().map(String::as_str) == Some("Message") => {
                    message = Some(e.unescape().unwrap().into_owned())
                }
                Event::Eof => break,
                _ => {}
            }
        }

        assert_eq!(elements, vec!["Response", "Message"]);
        assert_eq!(message.as_deref(), Some(text));
    }
}
