//! HTML page templates.
//!
//! Templates are static strings carrying `<!--MARKER-->` comments. Pages are
//! produced by [`render`], which replaces each marker with its value; a
//! marker with no value stays an invisible comment.

use chrono::{DateTime, Local};

/// Date format shown in the index footer.
pub const SERVER_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";

const STYLE: &str = r#"    <style>
        body { font-family: Arial, sans-serif; background: #f2f2f2; margin: 0; }
        .container { background: white; max-width: 520px; margin: 60px auto; padding: 30px;
                     border-radius: 10px; box-shadow: 0 0 10px rgba(0,0,0,0.1); text-align: center; }
        h1, h2 { color: #3f368d; }
        input[type="text"], input[type="password"], input[type="number"] {
            width: 100%; margin: 10px 0 20px 0; height: 30px; border: 1px solid #ccc; border-radius: 5px; }
        button { padding: 10px 16px; margin: 4px; background: #3f368d; color: white; border: none;
                 border-radius: 5px; font-weight: bold; cursor: pointer; }
        button:hover { background: #2e2b6b; }
        nav a { margin: 0 10px; color: #3f368d; font-weight: bold; }
        .scoreboard { display: flex; justify-content: space-around; margin-top: 20px; font-weight: bold; }
        footer { margin-top: 30px; font-size: 0.8em; color: #777; }
    </style>
"#;

pub const LOGIN: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Sign in</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h2>Sign in</h2>
        <form method="POST" action="/">
            <input type="text" name="user" placeholder="E-mail" required>
            <input type="password" name="pass" placeholder="Password" required>
            <button type="submit" name="accion" value="login">Enter</button>
            <button type="submit" name="accion" value="crear">Create account</button>
            <p style="color: <!--NOTICE_COLOR-->;"><!--NOTICE--></p>
        </form>
    </div>
</body>
</html>
"#;

pub const INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Casino</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>Casino</h1>
        <p>Welcome, <!--USER--></p>
        <nav>
            <a href="/adivina">Guess the number</a>
            <a href="/dados">Dice</a>
            <a href="/ppt">Rock, paper, scissors</a>
        </nav>
        <p><a href="/logout">Sign out</a></p>
        <footer>Server time: <!--DATE--><br>Play responsibly.</footer>
    </div>
</body>
</html>
"#;

pub const LOGOUT: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Signed out</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>You have signed out</h1>
        <p>Thanks for visiting, see you soon.</p>
        <a href="/">Back to start</a>
    </div>
</body>
</html>
"#;

pub const ERROR: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Not found</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>404</h1>
        <h2>Page not found</h2>
        <p>The page you are looking for does not exist or the request was malformed.</p>
        <p><a href="/">Back to start</a></p>
    </div>
</body>
</html>
"#;

pub const GUESS: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Guess the number</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>Guess the number</h1>
        <p>A number between 1 and 100. You have 10 attempts.</p>
        <p><!--RESULT--></p>
        <form action="/adivina" method="POST">
<!--CONTROLS-->        </form>
        <p><a href="/index">Back</a></p>
    </div>
</body>
</html>
"#;

pub const DICE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Dice</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>Dice</h1>
        <p>Beat the house over 5 rounds. Ties are rolled again.</p>
        <p><!--PLAYER--></p>
        <p><!--HOUSE--></p>
        <p><!--RESULT--></p>
        <form action="/dados" method="POST">
<!--CONTROLS-->        </form>
        <div class="scoreboard">
            <div>Player: <!--PLAYER_POINTS--></div>
            <div>House: <!--HOUSE_POINTS--></div>
        </div>
        <p><a href="/index">Back</a></p>
    </div>
</body>
</html>
"#;

pub const RPS: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Rock, paper, scissors</title>
<!--STYLE--></head>
<body>
    <div class="container">
        <h1>Rock, paper, scissors</h1>
        <p>Beat the house over 5 rounds. Ties are played again.</p>
        <form action="/ppt" method="POST">
<!--CONTROLS-->        </form>
        <p>You chose: <!--PLAYER--></p>
        <p>The house chose: <!--HOUSE--></p>
        <p><!--RESULT--></p>
        <div class="scoreboard">
            <div>Player: <!--PLAYER_POINTS--></div>
            <div>House: <!--HOUSE_POINTS--></div>
        </div>
        <p><a href="/index">Back</a></p>
    </div>
</body>
</html>
"#;

/// Message shown under the login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Error(String),
    Success(String),
}

/// Replace every `<!--MARKER-->` named in `values`. The shared stylesheet
/// is always filled in.
pub fn render(template: &str, values: &[(&str, &str)]) -> String {
    let mut page = template.replace("<!--STYLE-->", STYLE);
    for (marker, value) in values {
        page = page.replace(&format!("<!--{}-->", marker), value);
    }
    page
}

pub fn login(notice: Option<&Notice>) -> String {
    let (color, text) = match notice {
        Some(Notice::Error(text)) => ("red", escape(text)),
        Some(Notice::Success(text)) => ("green", escape(text)),
        None => ("red", String::new()),
    };
    render(LOGIN, &[("NOTICE_COLOR", color), ("NOTICE", &text)])
}

pub fn index(username: &str, now: DateTime<Local>) -> String {
    let date = now.format(SERVER_TIME_FORMAT).to_string();
    render(INDEX, &[("USER", &escape(username)), ("DATE", &date)])
}

pub fn logout() -> String {
    render(LOGOUT, &[])
}

pub fn error() -> String {
    render(ERROR, &[])
}

/// Escape text for inclusion in HTML element content.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_render_replaces_markers() {
        let page = render("<p><!--A--> and <!--B--></p><!--A-->", &[("A", "x"), ("B", "y")]);
        assert_eq!(page, "<p>x and y</p>x");
    }

    #[test]
    fn test_unfilled_marker_stays_a_comment() {
        let page = render(GUESS, &[("RESULT", "hello")]);
        assert!(page.contains("hello"));
        assert!(page.contains("<!--CONTROLS-->"));
        assert!(!page.contains("<!--STYLE-->"));
    }

    #[test]
    fn test_login_notice_colors() {
        let error = login(Some(&Notice::Error("Wrong password".to_string())));
        assert!(error.contains("color: red;"));
        assert!(error.contains("Wrong password"));

        let success = login(Some(&Notice::Success("Account created".to_string())));
        assert!(success.contains("color: green;"));
        assert!(success.contains("Account created"));
    }

    #[test]
    fn test_index_shows_user_and_time() {
        let now = Local.with_ymd_and_hms(2025, 3, 7, 9, 5, 0).unwrap();
        let page = index("ana@example.com", now);

        assert!(page.contains("Welcome, ana@example.com"));
        assert!(page.contains("07-03-2025 09:05"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<b>\"a\" & 'b'</b>"), "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;");
    }
}
