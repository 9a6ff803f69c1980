use axum::response::Html;

/// Minimal browser front end for trying the pipeline without a client.
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Corrag</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
  h1 { font-size: 1.4rem; }
  section { margin: 1.5rem 0; padding: 1rem; border: 1px solid #ddd; border-radius: 8px; }
  textarea { width: 100%; box-sizing: border-box; min-height: 4rem; font: inherit; }
  button { margin-top: .5rem; padding: .4rem 1rem; font: inherit; cursor: pointer; }
  #answer, #doc-text { white-space: pre-wrap; background: #f7f7f7; padding: .75rem; border-radius: 6px; }
  #doc-text { max-height: 20rem; overflow-y: auto; }
  li button { margin: 0 0 0 .5rem; padding: 0 .5rem; }
  .meta { color: #666; font-size: .85rem; }
  ul { padding-left: 1.2rem; }
</style>
</head>
<body>
<h1>Corrag &mdash; document Q&amp;A with a web-search fallback</h1>

<section>
  <h2>Ask a question</h2>
  <textarea id="question" placeholder="What does the report say about..."></textarea>
  <button id="ask">Ask</button>
  <div id="result" hidden>
    <p id="answer"></p>
    <p class="meta" id="answer-meta"></p>
  </div>
</section>

<section>
  <h2>Documents</h2>
  <ul id="documents"></ul>
  <input type="file" id="file" accept="application/pdf">
  <button id="upload">Upload PDF</button>
  <button id="rebuild">Rebuild index</button>
  <p class="meta" id="doc-status"></p>
  <pre id="doc-text" hidden></pre>
</section>

<script>
async function refreshDocuments() {
  const res = await fetch('/api/documents');
  const data = await res.json();
  const list = document.getElementById('documents');
  list.innerHTML = '';
  for (const doc of data.documents) {
    const li = document.createElement('li');
    li.textContent = doc.name + ' (' + doc.size_bytes + ' bytes)';
    const read = document.createElement('button');
    read.textContent = 'Read';
    read.addEventListener('click', () => readDocument(doc.name));
    li.appendChild(read);
    list.appendChild(li);
  }
}

async function readDocument(name) {
  const status = document.getElementById('doc-status');
  const text = document.getElementById('doc-text');
  const res = await fetch('/api/documents/' + encodeURIComponent(name) + '/text');
  const data = await res.json();
  if (!res.ok) {
    status.textContent = 'Error: ' + (data.error || res.status);
    return;
  }
  status.textContent = name;
  text.hidden = false;
  text.textContent = data.text;
}

document.getElementById('ask').addEventListener('click', async () => {
  const question = document.getElementById('question').value;
  const result = document.getElementById('result');
  const answer = document.getElementById('answer');
  const meta = document.getElementById('answer-meta');
  result.hidden = false;
  answer.textContent = 'Thinking...';
  meta.textContent = '';
  const res = await fetch('/api/query', {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ question })
  });
  const data = await res.json();
  if (!res.ok) {
    answer.textContent = 'Error: ' + (data.error || res.status);
    return;
  }
  answer.textContent = data.answer;
  const sources = data.sources.map(s => s.page ? s.source + ' p.' + s.page : s.source);
  meta.textContent = 'web search: ' + data.web_search +
    (sources.length ? ' | sources: ' + sources.join(', ') : '');
});

document.getElementById('upload').addEventListener('click', async () => {
  const input = document.getElementById('file');
  const status = document.getElementById('doc-status');
  if (!input.files.length) { status.textContent = 'Choose a PDF first.'; return; }
  const form = new FormData();
  form.append('file', input.files[0]);
  const res = await fetch('/api/documents', { method: 'POST', body: form });
  const data = await res.json();
  status.textContent = res.ok ? 'Uploaded.' : 'Error: ' + (data.error || res.status);
  refreshDocuments();
});

document.getElementById('rebuild').addEventListener('click', async () => {
  const status = document.getElementById('doc-status');
  status.textContent = 'Rebuilding...';
  const res = await fetch('/api/index/rebuild', { method: 'POST' });
  const data = await res.json();
  status.textContent = res.ok
    ? 'Indexed ' + data.indexed_chunks + ' chunks.'
    : 'Error: ' + (data.error || res.status);
});

refreshDocuments();
</script>
</body>
</html>
"#;
