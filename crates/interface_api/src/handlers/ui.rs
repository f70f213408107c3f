//! Browser form
//!
//! A single static page that drives the JSON API: submit the claim, run the
//! analysis, show per-image results and download the report.

use axum::response::Html;

const INDEX_HTML: &str = r##"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Claim Damage Assessment</title>
<style>
  body { font-family: system-ui, sans-serif; max-width: 960px; margin: 2rem auto; padding: 0 1rem; }
  fieldset { margin-bottom: 1rem; }
  label { display: block; margin: .5rem 0 .2rem; }
  input[type=text], input[type=date], textarea { width: 100%; box-sizing: border-box; }
  .result { border: 1px solid #ccc; padding: .75rem; margin: .75rem 0; }
  .failed { border-color: #9c0006; background: #ffc7ce; }
  .safety { color: #9c0006; font-weight: bold; }
  .stage { font-weight: bold; }
  pre { white-space: pre-wrap; }
</style>
</head>
<body>
<h1>Claim Damage Assessment</h1>
<p>Stage: <span class="stage" id="stage">NEW</span></p>

<form id="claim-form">
  <fieldset>
    <legend>Claim details</legend>
    <label for="claim_id">Claim ID</label>
    <input type="text" id="claim_id" name="claim_id">
    <label for="policy_number">Policy Number</label>
    <input type="text" id="policy_number" name="policy_number">
    <label for="incident_date">Incident Date</label>
    <input type="date" id="incident_date" name="incident_date">
  </fieldset>
  <fieldset>
    <legend>Claim description</legend>
    <textarea id="description" name="description" rows="5" required></textarea>
  </fieldset>
  <fieldset>
    <legend>Damage photos (PNG or JPEG)</legend>
    <input type="file" id="images" name="images" accept="image/png,image/jpeg" multiple required>
  </fieldset>
  <button type="submit">Submit claim</button>
  <button type="button" id="analyze" disabled>Analyze claim</button>
  <button type="button" id="report" disabled>Download report</button>
  <button type="button" id="reset">New claim</button>
</form>

<p id="message"></p>
<div id="results"></div>

<script>
const $ = (id) => document.getElementById(id);

function show(session) {
  $("stage").textContent = session.stage;
  $("analyze").disabled = session.stage === "NEW";
  $("report").disabled = !(session.stage === "ANALYZED" || session.stage === "REPORT_READY");
}

async function call(method, url, body) {
  const response = await fetch(url, { method, body });
  const data = await response.json();
  if (!response.ok) {
    throw new Error(data.message || response.statusText);
  }
  return data;
}

function renderResults(run) {
  const container = $("results");
  container.innerHTML = "";
  for (const result of run.results) {
    const div = document.createElement("div");
    div.className = result.status === "failed" ? "result failed" : "result";
    const title = document.createElement("h3");
    title.textContent = `Image ${result.index}: ${result.file_name}`;
    const body = document.createElement("pre");
    body.textContent = result.status === "failed"
      ? `Analysis failed: ${result.error}`
      : result.raw_text;
    div.append(title, body);
    if (result.safety_notes && result.safety_notes.toLowerCase().includes("critical")) {
      const safety = document.createElement("p");
      safety.className = "safety";
      safety.textContent = `Safety: ${result.safety_notes}`;
      div.append(safety);
    }
    container.append(div);
  }
}

$("claim-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  try {
    show(await call("POST", "/api/v1/claim", new FormData(event.target)));
    $("results").innerHTML = "";
    $("message").textContent = "Claim collected.";
  } catch (e) {
    $("message").textContent = e.message;
  }
});

$("analyze").addEventListener("click", async () => {
  $("message").textContent = "Analyzing images...";
  $("analyze").disabled = true;
  try {
    const run = await call("POST", "/api/v1/claim/analysis");
    renderResults(run);
    $("message").textContent = `Analysis complete: ${run.succeeded} succeeded, ${run.failed} failed.`;
    show(await call("GET", "/api/v1/claim"));
  } catch (e) {
    $("message").textContent = e.message;
    $("analyze").disabled = false;
  }
});

$("report").addEventListener("click", () => {
  window.location = "/api/v1/claim/report";
});

$("reset").addEventListener("click", async () => {
  show(await call("DELETE", "/api/v1/claim"));
  $("claim-form").reset();
  $("results").innerHTML = "";
  $("message").textContent = "";
});

call("GET", "/api/v1/claim").then(show).catch(() => {});
</script>
</body>
</html>
"##;

/// Serves the claim form
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
