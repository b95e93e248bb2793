//! Built-in shader pair used when no sources are configured.

pub const DEFAULT_VERT: &str = r#"#version 330 core
in vec4 aVertexPosition;
in vec4 aVertexColor;

uniform mat4 uModelViewMatrix;
uniform mat4 uProjectionMatrix;

out vec4 vColor;

void main() {
    gl_Position = uProjectionMatrix * uModelViewMatrix * aVertexPosition;
    vColor = aVertexColor;
}
"#;

pub const DEFAULT_FRAG: &str = r#"#version 330 core
in vec4 vColor;
out vec4 fragColor;

uniform float factor;
uniform vec4 colOffset;

void main() {
    fragColor = clamp(vColor * (1.0 - factor) + colOffset, 0.0, 1.0);
}
"#;
