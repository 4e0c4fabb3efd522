//! Interactive question form served at `/`.

pub const FORM_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Brand RAG Assistant</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 720px; margin: 3rem auto; padding: 0 1rem; }
  textarea { width: 100%; min-height: 4rem; font: inherit; }
  button { margin-top: .5rem; padding: .4rem 1.2rem; }
  #answer { white-space: pre-wrap; margin-top: 1.5rem; }
  .meta { color: #666; font-size: .9rem; }
  .error { color: #b00020; }
</style>
</head>
<body>
<h2>Brand RAG Assistant</h2>
<p class="meta">Answers come only from the indexed brand documents. If the docs do not cover a question, you will see the refusal text.</p>
<form id="ask-form" method="post" action="/ask">
  <textarea name="question" placeholder="e.g. Propose 2 ad copy options in our brand tone for the holiday sale." required></textarea>
  <button type="submit">Ask</button>
</form>
<div id="answer"></div>
<p id="meta" class="meta"></p>
<script>
const form = document.getElementById("ask-form");
const answer = document.getElementById("answer");
const meta = document.getElementById("meta");

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  const question = form.question.value.trim();
  if (!question) return;
  answer.className = "";
  answer.textContent = "Thinking...";
  meta.textContent = "";
  try {
    const res = await fetch("/ask", {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ question }),
    });
    const body = await res.json();
    if (!res.ok) {
      answer.className = "error";
      answer.textContent = body.detail + (body.error_tail ? "\n" + body.error_tail : "");
      return;
    }
    answer.textContent = body.answer;
    meta.textContent = "Sources: " + body.sources.join(", ") + " | Latency: " + body.latency + "s";
  } catch (err) {
    answer.className = "error";
    answer.textContent = String(err);
  }
});
</script>
</body>
</html>
"#;
