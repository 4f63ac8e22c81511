use shared_models::identity::AccountKind;

pub const SIGNUP_SUBJECT: &str = "Confirm your email";

pub fn activation_link(base_url: &str, kind: AccountKind, token: &str) -> String {
    format!(
        "{}/{}/activate_account/{}",
        base_url.trim_end_matches('/'),
        kind.path_segment(),
        token
    )
}

pub fn signup_html(name: &str, link: &str) -> String {
    let name = escape_html(name);
    let link = escape_html(link);

    format!(
        r#"<div style="font-family: Arial, sans-serif; line-height: 1.6;">
  <h2>Welcome, {name}!</h2>
  <p>Thanks for signing up. Please confirm your email address to activate your account.</p>
  <p><a href="{link}" style="display: inline-block; padding: 10px 20px; background: #2563eb; color: #ffffff; text-decoration: none; border-radius: 4px;">Activate account</a></p>
  <p>If the button does not work, copy this link into your browser:</p>
  <p>{link}</p>
  <p>This link expires in 24 hours.</p>
</div>"#
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_link_per_kind() {
        assert_eq!(
            activation_link("http://localhost:3000", AccountKind::Patient, "a.b.c"),
            "http://localhost:3000/user/activate_account/a.b.c"
        );
        assert_eq!(
            activation_link("https://clinic.example/", AccountKind::Doctor, "a.b.c"),
            "https://clinic.example/doctor/activate_account/a.b.c"
        );
    }

    #[test]
    fn test_body_greets_by_name_and_carries_link() {
        let html = signup_html("Ahmed", "http://localhost:3000/user/activate_account/a.b.c");
        assert!(html.contains("Welcome, Ahmed!"));
        assert!(html.contains(r#"href="http://localhost:3000/user/activate_account/a.b.c""#));
    }

    #[test]
    fn test_name_is_escaped() {
        let html = signup_html("<script>", "http://x/user/activate_account/t");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
